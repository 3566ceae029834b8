use std::collections::HashMap;
use std::sync::Arc;

use crate::http::request::Request;
use crate::http::resource::Resource;
use crate::http::response::Response;
use crate::log::Logger;

/// Turns a parsed request into a response.
///
/// This is the seam between the connection layer and whatever produces
/// content. Implementations are shared by every worker thread.
pub trait Responder: Send + Sync {
    fn respond(&self, request: &Request) -> Response;
}

/// Path-based registry of resources.
///
/// The registry is only mutated through `&mut self`. Once the engine is
/// wrapped in an `Arc` and handed to the server it is read-only, so workers
/// look resources up without locking.
pub struct WebEngine {
    resources: HashMap<String, Arc<dyn Resource>>,
    logger: Logger,
}

impl WebEngine {
    pub fn new(logger: Logger) -> Self {
        Self {
            resources: HashMap::new(),
            logger,
        }
    }

    /// Registers `resource` under its own identifier, replacing any resource
    /// already registered there.
    pub fn add_resource<R>(&mut self, resource: R)
    where
        R: Resource + 'static,
    {
        self.add_shared_resource(Arc::new(resource));
    }

    pub fn add_shared_resource(&mut self, resource: Arc<dyn Resource>) {
        let path = resource.unique_identifier().to_string();
        if self.resources.insert(path.clone(), resource).is_some() {
            self.logger.info(format!("Replaced resource registered at {}", path));
        } else {
            self.logger.verbose(format!("Registered resource at {}", path));
        }
    }

    pub fn remove_resource(&mut self, path: &str) -> Option<Arc<dyn Resource>> {
        self.resources.remove(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.resources.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Dispatches `request` by exact path match.
    ///
    /// Invalid requests get 400, unknown paths get 404; both with empty
    /// bodies and no headers. Never fails.
    pub fn route(&self, request: &Request) -> Response {
        if !request.valid {
            self.logger.warning("Rejecting malformed request with 400");
            return Response::bad_request();
        }

        match self.resources.get(&request.path) {
            Some(resource) => {
                let mut response = Response::default();
                resource.deliver(request, &mut response);
                response
            }
            None => {
                self.logger.verbose(format!("No resource for {} {}", request.method, request.path));
                Response::not_found()
            }
        }
    }
}

impl Responder for WebEngine {
    fn respond(&self, request: &Request) -> Response {
        self.route(request)
    }
}
