use crate::error::GatewayError;
use crate::model::modifier::{Modifier, ModifierAction, ModifierScope, ModifierTarget};
use crate::model::params::{rename_template_segment, strip_template_segment, Params};
use crate::model::request::Request;
use crate::resolver::Resolver;

use super::{unsupported, Modifiable};

/// Path parameters together with the template they are rendered into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    pub template: String,
    pub params: Params,
}

impl PathParams {
    pub fn new(template: impl Into<String>, params: Params) -> Self {
        Self {
            template: template.into(),
            params,
        }
    }

    pub fn render(&self) -> String {
        self.params.render(&self.template)
    }
}

impl Modifiable for PathParams {
    const TARGET: ModifierTarget = ModifierTarget::Params;

    fn modify(
        &self,
        modifier: &Modifier,
        resolver: &Resolver,
        warnings: &mut Vec<GatewayError>,
    ) -> Result<Self, GatewayError> {
        let key = modifier.key.as_str();
        match modifier.action {
            ModifierAction::Set | ModifierAction::Add => {
                let (value, errors) = resolver.get(&modifier.value);
                warnings.extend(errors);
                Ok(Self::new(self.template.clone(), self.params.set(key, value)))
            }
            ModifierAction::Del => Ok(Self::new(
                strip_template_segment(&self.template, key),
                self.params.del(key),
            )),
            ModifierAction::Rename => {
                let (to, errors) = resolver.get(&modifier.value);
                warnings.extend(errors);
                Ok(Self::new(
                    rename_template_segment(&self.template, key, &to),
                    self.params.rename(key, &to),
                ))
            }
            ModifierAction::Replace => Err(unsupported::<Self>(modifier)),
        }
    }

    fn from_request(request: &Request) -> Option<Self> {
        Some(Self::new(request.path(), request.params().clone()))
    }

    fn into_request(self, request: &Request) -> Request {
        request.with_params(self.params)
    }

    /// Responses have no path parameters.
    fn supports(scope: ModifierScope) -> bool {
        scope == ModifierScope::Request
    }
}
