//! Application state shared by all handlers.

use std::path::PathBuf;

use uap_jobs::JobTrigger;
use uap_state::StateStore;

use crate::config::Config;
use crate::render::PageRenderer;

pub(crate) struct AppState {
    pub(crate) store: StateStore,
    pub(crate) pages: PageRenderer,
    pub(crate) trigger: JobTrigger,
    pub(crate) static_dir: PathBuf,
}

impl AppState {
    pub(crate) fn from_config(config: &Config) -> Self {
        Self::new(config, JobTrigger::new(config.routines.clone()))
    }

    pub(crate) fn new(config: &Config, trigger: JobTrigger) -> Self {
        Self {
            store: StateStore::new(config.state.clone()),
            pages: PageRenderer::new(&config.template_dir),
            trigger,
            static_dir: config.static_dir.clone(),
        }
    }
}
