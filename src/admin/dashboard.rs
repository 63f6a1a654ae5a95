use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;

use crate::api::ResourceApi;
use crate::crud::{self, ManagerError, SectionHandle};
use crate::error::ValidationError;
use crate::section::{sections, Section};
use crate::session::SessionStore;

/// The admin dashboard: one CRUD manager per section and a selected tab.
///
/// Every manager takes its bearer credential from the session, so a logout
/// immediately strips the header from later requests.
pub struct Dashboard {
    session: SessionStore,
    tabs: Vec<SectionHandle>,
    tasks: Vec<JoinHandle<()>>,
    selected: usize,
}

impl Dashboard {
    /// Starts managers for every registered section. Nothing is fetched until
    /// a tab is selected.
    pub fn open<A>(api: A, session: SessionStore, status_duration: Duration) -> Self
    where
        A: ResourceApi + Clone,
    {
        Self::with_sections(sections(), api, session, status_duration)
    }

    pub fn with_sections<A>(
        sections: Vec<Section>,
        api: A,
        session: SessionStore,
        status_duration: Duration,
    ) -> Self
    where
        A: ResourceApi + Clone,
    {
        let (tabs, tasks): (Vec<_>, Vec<_>) = sections
            .into_iter()
            .map(|section| crud::spawn(section, api.clone(), session.clone(), status_duration))
            .unzip();
        info!(admin = %session.snapshot().display_name(), "Dashboard opened");
        Self {
            session,
            tabs,
            tasks,
            selected: 0,
        }
    }

    /// Tab labels in order.
    pub fn labels(&self) -> Vec<&str> {
        self.tabs.iter().map(|t| t.section().label.as_str()).collect()
    }

    /// Switches to the tab at `index` and loads it.
    pub async fn select(&mut self, index: usize) -> Result<&SectionHandle, ManagerError> {
        if index >= self.tabs.len() {
            return Err(ValidationError::Unsupported(format!("no section at tab {index}")).into());
        }
        self.selected = index;
        let tab = &self.tabs[index];
        info!(section = %tab.section().key, "Tab selected");
        tab.load().await?;
        Ok(tab)
    }

    /// Switches to the tab for `key` and loads it.
    pub async fn select_key(&mut self, key: &str) -> Result<&SectionHandle, ManagerError> {
        let index = self
            .tabs
            .iter()
            .position(|t| t.section().key == key)
            .ok_or_else(|| ValidationError::Unsupported(format!("unknown section {key}")))?;
        self.select(index).await
    }

    pub fn current(&self) -> Option<&SectionHandle> {
        self.tabs.get(self.selected)
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn section(&self, key: &str) -> Option<&SectionHandle> {
        self.tabs.iter().find(|t| t.section().key == key)
    }

    /// Header text: the admin's name, or "Admin" when the server sent none.
    pub fn admin_name(&self) -> String {
        self.session.snapshot().display_name().to_string()
    }

    /// Ends the session. The route guard takes it from there.
    pub fn logout(&self) {
        self.session.logout();
    }

    /// Stops every manager and waits for their tasks to finish.
    pub async fn shutdown(self) {
        drop(self.tabs);
        for task in self.tasks {
            let _ = task.await;
        }
        info!("Dashboard closed");
    }
}
