//! Final endpoint response rendering.

use crate::error::GatewayError;
use crate::model::body::Body;
use crate::model::header::{Header, X_GOPEN_CACHE, X_GOPEN_COMPLETE, X_GOPEN_SUCCESS};
use crate::model::history::HistoryEntry;
use crate::model::modifier::ModifierTarget;
use crate::model::request::Request;
use crate::model::response::{HttpResponse, Response};
use crate::model::status_code::StatusCode;
use crate::modifier;
use crate::resolver::Resolver;
use crate::transform::{aggregator, content, omitter};

/// Most frequent status; ties go to the one seen first.
fn most_frequent_status(entries: &[&HistoryEntry]) -> StatusCode {
    let mut counts: Vec<(StatusCode, usize)> = Vec::new();
    for entry in entries {
        let status = entry.response.status_code;
        match counts.iter_mut().find(|(s, _)| *s == status) {
            Some((_, count)) => *count += 1,
            None => counts.push((status, 1)),
        }
    }
    counts
        .iter()
        .fold(None, |best: Option<(StatusCode, usize)>, &(status, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((status, count)),
        })
        .map(|(status, _)| status)
        .unwrap_or(StatusCode::NO_CONTENT)
}

/// Build the client response from the endpoint state.
///
/// `expected` is the number of steps whose response should contribute;
/// the response is complete when that many made it into the filtered
/// history.
pub fn build_http_response(
    response: &Response,
    request: &Request,
    expected: usize,
) -> (HttpResponse, Vec<GatewayError>) {
    let endpoint = response.endpoint();
    let history = response.history();
    let mut errors = Vec::new();

    let contributing: Vec<&HistoryEntry> = if response.aborted() {
        history.last().into_iter().collect()
    } else {
        history.filtered()
    };

    let (mut status_code, mut header, mut body) = match contributing.as_slice() {
        [] => (StatusCode::NO_CONTENT, Header::new(), None),
        [single] => (
            single.response.status_code,
            aggregator::aggregate_headers(&Header::new(), &single.response.header),
            single.response.body.clone(),
        ),
        many => {
            let header = many.iter().fold(Header::new(), |acc, entry| {
                aggregator::aggregate_headers(&acc, &entry.response.header)
            });
            let value = if endpoint.response.aggregate {
                aggregator::aggregate_object(many)
            } else {
                aggregator::aggregate_array(many)
            };
            (most_frequent_status(many), header, Some(Body::json(&value)))
        }
    };

    if !response.propagated().is_empty() {
        let resolver = Resolver::new(request, history);
        for recorded in response.propagated() {
            let applied = match recorded.target {
                ModifierTarget::Header => modifier::apply(&header, &recorded.modifier, &resolver, &mut errors)
                    .map(|h| header = h),
                ModifierTarget::Query | ModifierTarget::Params => Ok(()),
                ModifierTarget::Body => modifier::apply(&body, &recorded.modifier, &resolver, &mut errors)
                    .map(|b| body = b),
                ModifierTarget::StatusCode => {
                    modifier::apply(&status_code, &recorded.modifier, &resolver, &mut errors)
                        .map(|s| status_code = s)
                }
            };
            if let Err(err) = applied {
                errors.push(err);
            }
        }
    }

    // omit-empty → nomenclature → content type → content encoding
    let config = &endpoint.response;
    if let Some(current) = body.take() {
        let mut shaped = current;
        if config.omit_empty {
            shaped = omitter::omit_empty_body(&shaped);
        }
        if let Some(nomenclature) = config.nomenclature {
            shaped = nomenclature.apply_body(&shaped);
        }
        if let Some(target) = config.content_type {
            match content::convert(&shaped, target) {
                Ok(converted) => shaped = converted,
                Err(err) => errors.push(err),
            }
        }
        if let Some(encoding) = config.content_encoding {
            shaped = content::modify_content_encoding(&shaped, encoding);
        }
        body = Some(shaped);
    }

    let success = !contributing.is_empty()
        && contributing.iter().all(|entry| !entry.response.status_code.failed());
    let complete = !response.aborted() && history.filtered().len() == expected;
    let header = header
        .set(X_GOPEN_CACHE, "false")
        .set(X_GOPEN_SUCCESS, success.to_string())
        .set(X_GOPEN_COMPLETE, complete.to_string());

    (
        HttpResponse {
            status_code,
            header,
            body,
        },
        errors,
    )
}
