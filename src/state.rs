//! Shared application state.
//!
//! One `Portal` is built at start-up and cloned into whatever needs it.

use std::sync::Arc;

use crate::api::{PortalApi, PortalClient};
use crate::config::ConfigV1;
use crate::error::ClientError;
use crate::router::RouteTable;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct Portal {
    pub config: Arc<ConfigV1>,
    pub client: PortalClient,
    pub api: PortalApi,
    /// Shared by every clone, so all of them see the same user.
    pub session: SessionStore,
    pub routes: Arc<RouteTable>,
}

impl Portal {
    pub fn new(config: Arc<ConfigV1>) -> Result<Self, ClientError> {
        let client = PortalClient::new(&config.portal)?;
        let session = SessionStore::new(client.clone(), config.portal.userinfo_endpoint.clone());
        Ok(Portal {
            api: PortalApi::new(client.clone()),
            client,
            session,
            routes: Arc::new(RouteTable::portal()),
            config,
        })
    }
}
