//! Shared setup for the integration tests.

#![allow(dead_code)]

use syspharma::commands::auth;
use syspharma::{App, AppConfig, AppState};
use syspharma_core::{Money, ProductoForm, RegisterForm};

pub const CLIENTE_PASSWORD: &str = "Cliente#2024";

pub async fn app() -> App {
    let app = App::new(AppConfig::in_memory()).await.unwrap();
    app.ensure_default_admin().await.unwrap();
    app
}

pub async fn login_admin(state: &AppState) {
    let admin = state.config().admin.clone();
    auth::login(state, &admin.email, &admin.password).await.unwrap();
}

pub async fn register_cliente(state: &AppState, email: &str) {
    auth::register(
        state,
        RegisterForm {
            name: "María Pérez".to_string(),
            email: email.to_string(),
            phone: Some("3109876543".to_string()),
            password: CLIENTE_PASSWORD.to_string(),
            confirm_password: CLIENTE_PASSWORD.to_string(),
        },
    )
    .await
    .unwrap();
}

pub fn producto(codigo: &str, stock: i64) -> ProductoForm {
    ProductoForm {
        codigo: codigo.to_string(),
        nombre: format!("Producto {}", codigo),
        descripcion: None,
        precio: Money::from_pesos(7_500),
        stock,
        categoria: "Vitaminas".to_string(),
        imagen: None,
        mostrar_en_catalogo: true,
    }
}
