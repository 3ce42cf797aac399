//! # Citas Operations
//!
//! Clients book appointments for themselves; staff move them through
//! their states.
//!
//! ```text
//!   pendiente ──► confirmada ──► completada
//!       │              │
//!       └──────┬───────┘
//!              ▼
//!          cancelada
//! ```

use chrono::Local;
use syspharma_core::{Cita, CitaForm, CoreError, EstadoCita, Role};
use syspharma_store::generate_id;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Books an appointment for the logged-in user.
pub async fn agendar(state: &AppState, form: CitaForm) -> AppResult<Cita> {
    debug!(fecha = %form.fecha, hora = %form.hora, "citas::agendar command");
    let result = book(state, form).await;
    state.notify(result, "Cita agendada")
}

async fn book(state: &AppState, form: CitaForm) -> AppResult<Cita> {
    let user = state.session().await?;
    form.validate(Local::now().date_naive())?;

    let cita = Cita {
        id: generate_id(),
        cliente_id: user.id.clone(),
        cliente_nombre: user.name.clone(),
        fecha: form.fecha,
        hora: form.hora,
        motivo: form.motivo.trim().to_string(),
        estado: EstadoCita::Pendiente,
        notas: form.notas(),
    };

    let cita = state.storage().citas().insert(cita).await?;
    state.changed();

    info!(id = %cita.id, cliente = %cita.cliente_id, "Cita booked");
    Ok(cita)
}

/// Mis citas: the logged-in user's appointments.
pub async fn list_for_cliente(state: &AppState) -> AppResult<Vec<Cita>> {
    debug!("citas::list_for_cliente command");
    let user = state.session().await?;
    state.simulate_latency().await;

    Ok(state.storage().citas().list_for_cliente(&user.id).await?)
}

/// Every appointment, for staff. Optionally only one estado.
pub async fn list(state: &AppState, estado: Option<EstadoCita>) -> AppResult<Vec<Cita>> {
    debug!(?estado, "citas::list command");
    state.require_staff().await?;
    state.simulate_latency().await;

    let citas = state.storage().citas();
    Ok(match estado {
        Some(estado) => citas.list_by_estado(estado).await?,
        None => citas.list().await?,
    })
}

pub async fn cambiar_estado(state: &AppState, id: &str, estado: EstadoCita) -> AppResult<Cita> {
    debug!(id = %id, estado = %estado, "citas::cambiar_estado command");
    let result = change_estado(state, id, estado).await;
    state.notify(result, "Estado de la cita actualizado")
}

async fn change_estado(state: &AppState, id: &str, estado: EstadoCita) -> AppResult<Cita> {
    state.require_staff().await?;
    transition(state, id, estado).await
}

/// Cancels an appointment. Clients may only cancel their own.
pub async fn cancelar(state: &AppState, id: &str) -> AppResult<Cita> {
    debug!(id = %id, "citas::cancelar command");
    let result = cancel(state, id).await;
    state.notify(result, "Cita cancelada")
}

async fn cancel(state: &AppState, id: &str) -> AppResult<Cita> {
    let user = state.session().await?;

    if user.role == Role::Cliente {
        let cita = find(state, id).await?;
        if cita.cliente_id != user.id {
            return Err(AppError::forbidden());
        }
    }

    transition(state, id, EstadoCita::Cancelada).await
}

async fn find(state: &AppState, id: &str) -> AppResult<Cita> {
    state
        .storage()
        .citas()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Cita", id))
}

async fn transition(state: &AppState, id: &str, estado: EstadoCita) -> AppResult<Cita> {
    let mut cita = find(state, id).await?;

    if !cita.estado.can_transition_to(estado) {
        return Err(CoreError::InvalidTransition {
            from: cita.estado.to_string(),
            to: estado.to_string(),
        }
        .into());
    }

    let from = cita.estado;
    cita.estado = estado;
    state.storage().citas().update(&cita).await?;
    state.changed();

    info!(id = %id, from = %from, to = %estado, "Cita estado changed");
    Ok(cita)
}
