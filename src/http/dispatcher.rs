use std::collections::HashMap;
use std::sync::Arc;

use crate::http::request::Request;
use crate::http::response::Response;

/// Turns a request into a response.
///
/// Returning `None` tells the connection to hang up without writing
/// anything. Failures must be reported as responses (403, 404, ...), a
/// handler has no error channel.
pub trait Handler: Send + Sync {
    fn handle(&self, request: &Request) -> Option<Response>;
}

impl<F> Handler for F
where
    F: Fn(&Request) -> Option<Response> + Send + Sync,
{
    fn handle(&self, request: &Request) -> Option<Response> {
        self(request)
    }
}

/// Routes requests to handlers by exact, case-sensitive method token.
///
/// Configured once before serving and shared read-only afterwards.
#[derive(Default, Clone)]
pub struct Dispatcher {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `method`, replacing any earlier registration.
    pub fn set_handler(&mut self, method: impl Into<String>, handler: impl Handler + 'static) {
        self.handlers.insert(method.into(), Arc::new(handler));
    }

    pub fn has_handler(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Checks, in order: version, method presence, handler presence; the
    /// first failing check answers with 505, 400 or 405 respectively.
    pub fn dispatch(&self, request: &Request) -> Option<Response> {
        match request.http_version.as_deref() {
            Some(version) if version != "HTTP/1.0" && version.starts_with("HTTP/1.") => {}
            Some(version) => return Some(Response::version_not_supported(version)),
            None => return Some(Response::version_not_supported("")),
        }

        let method = match request.method.as_deref() {
            Some(method) if !method.is_empty() => method,
            _ => return Some(Response::bad_request("No method is set")),
        };

        match self.handlers.get(method) {
            Some(handler) => handler.handle(request),
            None => Some(Response::method_not_allowed(method)),
        }
    }
}
