//! Outbound request construction and backend response post-processing.

use std::sync::Arc;

use crate::error::GatewayError;
use crate::load_balancer::LoadBalancer;
use crate::model::backend::Backend;
use crate::model::body::Body;
use crate::model::header::{Header, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE};
use crate::model::modifier::{Modifier, ModifierContext};
use crate::model::request::{BackendRequest, Request};
use crate::model::response::{BackendResponse, Response};
use crate::modifier::{self, Modifiable, Outcome, PathParams};
use crate::resolver::Resolver;
use crate::transform::{aggregator, content, omitter};

/// Everything produced by one build step.
#[derive(Debug)]
pub struct Built<T> {
    pub value: T,
    /// Inbound request after propagated modifiers.
    pub request: Request,
    /// Endpoint response after recorded modifiers.
    pub response: Response,
    /// Non-fatal problems; `value` is usable regardless.
    pub errors: Vec<GatewayError>,
}

/// Threads the global request/response through successive modifier runs.
struct Pipeline<'a> {
    phase: ModifierContext,
    resolver: &'a Resolver,
    request: Request,
    response: Response,
    errors: Vec<GatewayError>,
}

impl<'a> Pipeline<'a> {
    fn new(phase: ModifierContext, resolver: &'a Resolver, request: &Request, response: &Response) -> Self {
        Self {
            phase,
            resolver,
            request: request.clone(),
            response: response.clone(),
            errors: Vec::new(),
        }
    }

    fn modify<T: Modifiable>(&mut self, modifiers: &[Modifier], local: T) -> T {
        let Outcome {
            local,
            request,
            response,
            errors,
        } = modifier::execute(
            modifiers,
            self.phase,
            local,
            self.request.clone(),
            self.response.clone(),
            self.resolver,
        );
        self.request = request;
        self.response = response;
        self.errors.extend(errors);
        local
    }

    /// Keep the last good value when a step fails.
    fn step<T: Clone>(&mut self, value: T, f: impl FnOnce(&T) -> Result<T, GatewayError>) -> T {
        match f(&value) {
            Ok(next) => next,
            Err(err) => {
                self.errors.push(err);
                value
            }
        }
    }

    fn finish<T>(self, value: T) -> Built<T> {
        Built {
            value,
            request: self.request,
            response: self.response,
            errors: self.errors,
        }
    }
}

fn body_step(
    pipeline: &mut Pipeline<'_>,
    body: Option<Body>,
    f: impl FnOnce(&Body) -> Result<Body, GatewayError>,
) -> Option<Body> {
    match body {
        Some(body) => Some(pipeline.step(body, f)),
        None => None,
    }
}

fn is_body_header(key: &str) -> bool {
    [CONTENT_TYPE, CONTENT_LENGTH, CONTENT_ENCODING]
        .iter()
        .any(|k| k.eq_ignore_ascii_case(key))
}

/// Build the request for one backend call.
///
/// The returned request is always usable; transform and modifier failures
/// are reported in `errors` and leave the affected part at its last good
/// value.
pub fn build_request(
    backend: &Backend,
    request: &Request,
    response: &Response,
    load_balancer: &dyn LoadBalancer,
) -> Built<BackendRequest> {
    let resolver = Resolver::new(request, response.history());
    let mut pipeline = Pipeline::new(ModifierContext::Request, &resolver, request, response);
    let config = &backend.request;

    let host = load_balancer.next_host(&backend.hosts).unwrap_or_default().to_string();

    // body: map → project → modify → omit-empty → nomenclature → content type → encoding
    let body = if backend.omit_request_body() {
        None
    } else {
        let body = request.body().cloned();
        let body = body_step(&mut pipeline, body, |b| config.body_mapper.map_body(b));
        let body = body_step(&mut pipeline, body, |b| config.body_projection.project_body(b));
        let body = pipeline.modify(&backend.modifiers.body, body);
        let body = body.map(|b| if config.omit_empty { omitter::omit_empty_body(&b) } else { b });
        let body = match config.nomenclature {
            Some(nomenclature) => body.map(|b| nomenclature.apply_body(&b)),
            None => body,
        };
        let body = match config.content_type {
            Some(target) => body_step(&mut pipeline, body, |b| content::convert(b, target)),
            None => body,
        };
        match config.content_encoding {
            Some(encoding) => body.map(|b| content::modify_content_encoding(&b, encoding)),
            None => body,
        }
    };

    // path
    let params = PathParams::new(backend.path.clone(), request.params().clone());
    let path = pipeline.modify(&backend.modifiers.param, params).render();

    // header: forward-filter → map → project → modify. Body headers are
    // written by the client from the final body.
    let header = request
        .header()
        .retain(|key| backend.forwards_header(key) && !is_body_header(key));
    let header = config.header_mapper.map_header(&header);
    let header = config.header_projection.project_header(&header);
    let header = pipeline.modify(&backend.modifiers.header, header);

    // query: forward-filter → map → project → modify
    let query = request.query().retain(|key| backend.forwards_query(key));
    let query = config.query_mapper.map_query(&query);
    let query = config.query_projection.project_query(&query);
    let query = pipeline.modify(&backend.modifiers.query, query);

    pipeline.finish(BackendRequest {
        method: backend.method.clone(),
        host,
        path,
        header,
        query,
        body,
    })
}

/// Post-process a backend response.
///
/// `value` is `None` when the backend omits its response; response modifiers
/// still run so their propagated effects apply.
pub fn build_response(
    backend: &Arc<Backend>,
    backend_request: &BackendRequest,
    raw: &BackendResponse,
    request: &Request,
    response: &Response,
) -> Built<Option<BackendResponse>> {
    // The call being processed is visible to expressions as the last entry.
    let history = response
        .history()
        .add(backend.clone(), backend_request.clone(), raw.clone());
    let resolver = Resolver::new(request, &history);
    let mut pipeline = Pipeline::new(ModifierContext::Response, &resolver, request, response);
    let config = &backend.response;

    // header: aggregate → map → project → modify
    let header = aggregator::aggregate_headers(&Header::new(), &raw.header);
    let header = config.header_mapper.map_header(&header);
    let header = config.header_projection.project_header(&header);
    let header = pipeline.modify(&backend.modifiers.header, header);

    // body: map → project → modify → group
    let body = raw.body.clone();
    let body = body_step(&mut pipeline, body, |b| config.body_mapper.map_body(b));
    let body = body_step(&mut pipeline, body, |b| config.body_projection.project_body(b));
    let body = pipeline.modify(&backend.modifiers.body, body);
    let body = match backend.group_response() {
        Some(key) => body.map(|b| aggregator::group_body(key, &b)),
        None => body,
    };

    let status_code = pipeline.modify(&backend.modifiers.status_code, raw.status_code);

    let processed = BackendResponse::new(status_code, header, body);
    pipeline.finish((!backend.omit_response()).then_some(processed))
}
