//! # Seed Data Generator
//!
//! Fills local storage with demo inventory for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./syspharma_dev.db
//! cargo run -p syspharma-store --bin syspharma-seed
//!
//! # Specify storage path
//! cargo run -p syspharma-store --bin syspharma-seed -- --db ./data/syspharma.db
//! ```
//!
//! ## Generated Data
//! - Productos across pharmacy categories, most of them shown in the catalog
//! - A handful of proveedores with valid NITs and phones
//! - One opening compra per proveedor
//!
//! Users are not seeded: the `syspharma` binary creates the default admin.

use chrono::{Duration, Utc};
use std::env;
use syspharma_core::{order_total, Compra, LineaOrden, Money, Producto, Proveedor};
use syspharma_store::{generate_id, Database, StoreConfig};

/// (codigo prefix, categoría, products)
const CATEGORIES: &[(&str, &str, &[&str])] = &[
    (
        "ANL",
        "Analgésicos",
        &[
            "Acetaminofén 500mg",
            "Ibuprofeno 400mg",
            "Naproxeno 250mg",
            "Diclofenaco gel",
            "Ácido acetilsalicílico 100mg",
        ],
    ),
    (
        "ANT",
        "Antigripales",
        &[
            "Jarabe para la tos",
            "Descongestionante nasal",
            "Pastillas para la garganta",
            "Antigripal día y noche",
        ],
    ),
    (
        "VIT",
        "Vitaminas",
        &[
            "Vitamina C 1g",
            "Complejo B",
            "Vitamina D3",
            "Multivitamínico adulto",
            "Hierro + ácido fólico",
        ],
    ),
    (
        "CUR",
        "Curación",
        &[
            "Gasa estéril",
            "Alcohol antiséptico",
            "Curitas surtidas",
            "Esparadrapo",
            "Agua oxigenada",
        ],
    ),
    (
        "HIG",
        "Higiene",
        &[
            "Jabón antibacterial",
            "Crema dental",
            "Protector solar FPS 50",
            "Gel antibacterial",
        ],
    ),
];

/// (nombre, nit, email, telefono)
const PROVEEDORES: &[(&str, &str, &str, &str)] = &[
    ("Droguería Central", "900123456", "ventas@central.co", "6015551234"),
    ("Laboratorios Andinos", "8301234567", "pedidos@andinos.co", "6045559876"),
    ("Distribuidora Salud", "901765432", "contacto@dsalud.co", "3105554321"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./syspharma_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("SysPharma Seed Data Generator");
                println!();
                println!("Usage: syspharma-seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Storage file path (default: ./syspharma_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 SysPharma Seed Data Generator");
    println!("================================");
    println!("Storage: {}", db_path);
    println!();

    let db = Database::new(StoreConfig::new(&db_path)).await?;
    let storage = db.open_tab();

    println!("✓ Connected to storage");
    println!("✓ Migrations applied");

    let existing = storage.productos().count().await?;
    if existing > 0 {
        println!("⚠ Storage already has {} productos", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the storage file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating productos...");

    let mut productos = Vec::new();
    for (category_idx, (prefix, categoria, names)) in CATEGORIES.iter().enumerate() {
        for (idx, name) in names.iter().enumerate() {
            let producto = generate_producto(prefix, categoria, name, category_idx * 10 + idx);
            match storage.productos().insert(producto).await {
                Ok(p) => productos.push(p),
                Err(e) => eprintln!("Failed to insert {}: {}", name, e),
            }
        }
    }
    println!("✓ Generated {} productos", productos.len());

    println!();
    println!("Generating proveedores and compras...");

    let now = Utc::now();
    for (idx, (nombre, nit, email, telefono)) in PROVEEDORES.iter().enumerate() {
        let proveedor = Proveedor {
            id: generate_id(),
            nombre: nombre.to_string(),
            nit: nit.to_string(),
            email: email.to_string(),
            telefono: telefono.to_string(),
            direccion: None,
        };
        if let Err(e) = storage.proveedores().insert(proveedor).await {
            eprintln!("Failed to insert {}: {}", nombre, e);
            continue;
        }

        let lineas: Vec<LineaOrden> = productos
            .iter()
            .skip(idx)
            .step_by(PROVEEDORES.len())
            .map(|p| LineaOrden {
                id: p.id.clone(),
                nombre: p.nombre.clone(),
                cantidad: 12,
                precio: Money::from_centavos(p.precio.centavos() * 60 / 100),
            })
            .collect();

        let compra = Compra {
            id: generate_id(),
            fecha: now - Duration::days(30 - idx as i64),
            proveedor: nombre.to_string(),
            total: order_total(&lineas)?,
            productos: lineas,
        };
        storage.compras().insert(compra).await?;
    }

    println!(
        "✓ Generated {} proveedores, {} compras",
        storage.proveedores().count().await?,
        storage.compras().count().await?
    );

    println!();
    println!("Verifying catalog...");
    let catalogo = storage.productos().catalogo("").await?;
    println!("  Catalog: {} productos", catalogo.len());
    let categorias = storage.productos().categorias().await?;
    println!("  Categorías: {}", categorias.join(", "));

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Generates a single producto with deterministic data.
fn generate_producto(prefix: &str, categoria: &str, nombre: &str, seed: usize) -> Producto {
    // $2.500 - $42.000 in $500 steps
    let precio = Money::from_pesos(2_500 + ((seed * 37) % 80) as i64 * 500);

    // Every seventh product is hidden from the catalog, every eleventh is sold out.
    let mostrar = seed % 7 != 6;
    let stock = if seed % 11 == 10 { 0 } else { 5 + (seed % 40) as i64 };

    Producto {
        id: generate_id(),
        codigo: format!("{}-{:03}", prefix, seed),
        nombre: nombre.to_string(),
        descripcion: Some(format!("{} - presentación comercial", categoria)),
        precio,
        stock,
        categoria: categoria.to_string(),
        imagen: None,
        mostrar_en_catalogo: Some(mostrar),
    }
}
