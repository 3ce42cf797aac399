//! # Cita Repository
//!
//! Appointments under `syspharma_citas`.
//!
//! Status transitions are checked by the caller before `update`; this layer
//! stores whatever it is given.

use syspharma_core::{Cita, EstadoCita};
use tracing::debug;

use crate::error::StoreResult;
use crate::repository::Collection;
use crate::storage::LocalStorage;

#[derive(Debug, Clone)]
pub struct CitaRepository {
    citas: Collection<Cita>,
}

fn by_schedule(citas: &mut [Cita]) {
    citas.sort_by(|a, b| (a.fecha, a.hora).cmp(&(b.fecha, b.hora)));
}

impl CitaRepository {
    pub fn new(storage: LocalStorage) -> Self {
        CitaRepository {
            citas: Collection::new(storage),
        }
    }

    /// All appointments in schedule order.
    pub async fn list(&self) -> StoreResult<Vec<Cita>> {
        let mut citas = self.citas.load().await?;
        by_schedule(&mut citas);
        Ok(citas)
    }

    pub async fn list_for_cliente(&self, cliente_id: &str) -> StoreResult<Vec<Cita>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|c| c.cliente_id == cliente_id)
            .collect())
    }

    pub async fn list_by_estado(&self, estado: EstadoCita) -> StoreResult<Vec<Cita>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|c| c.estado == estado)
            .collect())
    }

    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Cita>> {
        self.citas.get_by_id(id).await
    }

    pub async fn insert(&self, cita: Cita) -> StoreResult<Cita> {
        debug!(cliente = %cita.cliente_id, fecha = %cita.fecha, hora = %cita.hora, "Inserting cita");
        self.citas.append(cita).await
    }

    pub async fn update(&self, cita: &Cita) -> StoreResult<()> {
        debug!(id = %cita.id, estado = %cita.estado, "Updating cita");
        self.citas.replace(cita).await
    }

    pub async fn count(&self) -> StoreResult<usize> {
        self.citas.count().await
    }
}
