//! Recording and failing stand-ins for the host and the TV

use ha_core::{Context, ServiceCall, State};
use ha_samsungtv_smart::{ArtModeClient, ArtModeConnector, ArtModeError, StateReader};
use ha_service_registry::{ServiceError, ServiceRegistry};
use ha_state_store::StateStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// How a recorded service handler answers
#[derive(Clone)]
pub enum Reply {
    Ok,
    Fail,
    /// Succeed and copy `data_key` of the call into `attribute` of the
    /// target entity, like a TV that actually switched
    Apply {
        states: Arc<StateStore>,
        attribute: &'static str,
        data_key: &'static str,
    },
}

/// Service calls received by handlers registered through it
#[derive(Clone, Default)]
pub struct ServiceLog {
    calls: Arc<Mutex<Vec<ServiceCall>>>,
}

impl ServiceLog {
    pub fn register(&self, services: &ServiceRegistry, domain: &str, service: &str, reply: Reply) {
        let calls = self.calls.clone();
        services.register(domain, service, move |call: ServiceCall| {
            calls.lock().unwrap().push(call.clone());
            let reply = reply.clone();
            async move {
                match reply {
                    Reply::Ok => Ok(()),
                    Reply::Fail => Err(ServiceError::CallFailed("TV did not answer".to_string())),
                    Reply::Apply {
                        states,
                        attribute,
                        data_key,
                    } => {
                        let value = call.service_data[data_key].clone();
                        for entity_id in call.entity_ids() {
                            states.update_attributes(
                                &entity_id,
                                HashMap::from([(attribute.to_string(), value.clone())]),
                                Context::new(),
                            );
                        }
                        Ok(())
                    }
                }
            }
        });
    }

    pub fn calls(&self) -> Vec<ServiceCall> {
        self.calls.lock().unwrap().clone()
    }

    /// `domain.service` of every call, in order
    pub fn service_ids(&self) -> Vec<String> {
        self.calls().iter().map(ServiceCall::service_id).collect()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

/// State reader counting full state reads (attribute polls)
pub struct CountingStates {
    inner: Arc<StateStore>,
    reads: AtomicU32,
}

impl CountingStates {
    pub fn new(inner: Arc<StateStore>) -> Self {
        Self {
            inner,
            reads: AtomicU32::new(0),
        }
    }

    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.reads.store(0, Ordering::SeqCst);
    }
}

impl StateReader for CountingStates {
    fn state(&self, entity_id: &str) -> Option<State> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get(entity_id)
    }

    fn contains(&self, entity_id: &str) -> bool {
        self.inner.contains(entity_id)
    }
}

/// Art Mode client remembering every request
#[derive(Default)]
pub struct FakeArtMode {
    requests: Mutex<Vec<bool>>,
    failing: AtomicBool,
}

impl FakeArtMode {
    pub fn requests(&self) -> Vec<bool> {
        self.requests.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl ArtModeClient for FakeArtMode {
    fn set_art_mode(&self, on: bool) -> Result<(), ArtModeError> {
        self.requests.lock().unwrap().push(on);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ArtModeError::Request("websocket closed".to_string()));
        }
        Ok(())
    }
}

/// Connector handing out `client` for any host
pub fn connector(client: Arc<FakeArtMode>) -> Arc<dyn ArtModeConnector> {
    Arc::new(move |_host: &str| -> Result<Arc<dyn ArtModeClient>, ArtModeError> {
        Ok(client.clone() as Arc<dyn ArtModeClient>)
    })
}
