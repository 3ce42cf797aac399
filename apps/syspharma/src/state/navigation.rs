//! Sidebar entries per role and the selected dashboard tab.

use serde::Serialize;
use syspharma_core::Role;
use tracing::debug;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tab {
    Dashboard,
    Productos,
    Proveedores,
    Compras,
    Ventas,
    Usuarios,
    Citas,
    Catalogo,
    Carrito,
    MisCitas,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub tab: Tab,
    pub label: &'static str,
}

const fn entry(tab: Tab, label: &'static str) -> MenuEntry {
    MenuEntry { tab, label }
}

const ADMIN_MENU: &[MenuEntry] = &[
    entry(Tab::Dashboard, "Inicio"),
    entry(Tab::Productos, "Productos"),
    entry(Tab::Proveedores, "Proveedores"),
    entry(Tab::Compras, "Compras"),
    entry(Tab::Ventas, "Ventas"),
    entry(Tab::Usuarios, "Usuarios"),
    entry(Tab::Citas, "Citas"),
];

const EMPLEADO_MENU: &[MenuEntry] = &[
    entry(Tab::Dashboard, "Inicio"),
    entry(Tab::Productos, "Productos"),
    entry(Tab::Ventas, "Ventas"),
    entry(Tab::Citas, "Citas"),
];

const CLIENTE_MENU: &[MenuEntry] = &[
    entry(Tab::Catalogo, "Catálogo"),
    entry(Tab::Carrito, "Carrito"),
    entry(Tab::MisCitas, "Mis citas"),
];

/// Sidebar entries visible to `role`, in display order.
pub fn menu_for(role: Role) -> &'static [MenuEntry] {
    match role {
        Role::Admin => ADMIN_MENU,
        Role::Empleado => EMPLEADO_MENU,
        Role::Cliente => CLIENTE_MENU,
    }
}

/// The dashboard shell: role plus the tab in view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    role: Role,
    selected: Tab,
}

impl Dashboard {
    /// Opens on the first entry of the role's menu.
    pub fn new(role: Role) -> Self {
        let selected = menu_for(role)
            .first()
            .map(|e| e.tab)
            .unwrap_or(Tab::Dashboard);
        Dashboard { role, selected }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn selected(&self) -> Tab {
        self.selected
    }

    pub fn menu(&self) -> &'static [MenuEntry] {
        menu_for(self.role)
    }

    pub fn can_open(&self, tab: Tab) -> bool {
        self.menu().iter().any(|e| e.tab == tab)
    }

    /// Switches tab. Tabs outside the role's menu are rejected and the
    /// selection is left as it was.
    pub fn select(&mut self, tab: Tab) -> AppResult<()> {
        if !self.can_open(tab) {
            debug!(role = %self.role, ?tab, "Tab not in menu");
            return Err(AppError::forbidden());
        }
        self.selected = tab;
        Ok(())
    }
}
