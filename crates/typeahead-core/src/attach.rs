//! Binding engine instances to host elements.

use tracing::{info, warn};

use crate::config::{EngineConfig, InstanceConfig};
use crate::error::{AttachError, ConfigError, Result};
use crate::host::{ElementKind, Host, Placement};
use crate::session::Autocomplete;

/// Attach a typeahead to one element.
///
/// A select element is first paired with a generated search input; the
/// engine then binds to that input. Anything that is not a text or search
/// input is rejected. On success the host's native suggestions are turned
/// off and the (closed) results view is placed under the input.
pub fn attach<H: Host>(mut host: H, instance: &InstanceConfig) -> Result<Autocomplete<H>> {
    let mut companion = false;
    if host.element_kind() == ElementKind::Select {
        host.create_companion_input()
            .map_err(|reason| AttachError::CompanionUnavailable { reason })?;
        companion = true;
    }

    let kind = host.element_kind();
    if !kind.is_compatible() {
        return Err(AttachError::Incompatible {
            element: kind.describe(),
        }
        .into());
    }

    let config = EngineConfig::resolve(instance, &host)?;
    if config.url().is_none() {
        warn!("typeahead attached without an endpoint; queries will not be sent");
    }

    host.disable_native_autocomplete();
    let placement = Placement::below(host.geometry());
    host.place(placement);
    host.set_open(false);

    info!(
        element = %kind.describe(),
        url = config.url().unwrap_or(""),
        method = %config.http_method(),
        companion,
        "typeahead attached"
    );
    Ok(Autocomplete::new(host, config, companion))
}

/// Attach to every element in `hosts`.
///
/// An invalid mapping configuration is fatal for the whole batch. Elements
/// that cannot carry a typeahead are skipped with a warning.
pub fn attach_all<H, I>(hosts: I, instance: &InstanceConfig) -> std::result::Result<Vec<Autocomplete<H>>, ConfigError>
where
    H: Host,
    I: IntoIterator<Item = H>,
{
    instance.build_mappings()?;

    let mut attached = Vec::new();
    for host in hosts {
        match attach(host, instance) {
            Ok(engine) => attached.push(engine),
            Err(crate::error::TypeaheadError::Attach(err)) => warn!(error = %err, "skipping element"),
            Err(crate::error::TypeaheadError::Config(err)) => return Err(err),
        }
    }
    Ok(attached)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ATTR_LIMIT, MappingSpec};
    use crate::error::TypeaheadError;
    use crate::testing::MockHost;

    #[test]
    fn text_input_attaches_closed_and_placed() {
        let engine = attach(MockHost::with_url("/s"), &InstanceConfig::new()).expect("attach");
        let host = engine.host();
        assert!(!host.native_autocomplete);
        assert!(!host.open);
        assert_eq!(host.placements.len(), 1);
        assert_eq!(engine.config().url(), Some("/s"));
        assert!(!engine.has_companion());
    }

    #[test]
    fn incompatible_element_is_rejected() {
        let mut host = MockHost::with_url("/s");
        host.kind = ElementKind::Input {
            input_type: "checkbox".to_string(),
        };
        let err = attach(host, &InstanceConfig::new()).err().expect("rejected");
        assert!(matches!(
            err,
            TypeaheadError::Attach(AttachError::Incompatible { ref element }) if element == "input[type=checkbox]"
        ));
    }

    #[test]
    fn select_gets_a_companion_input() {
        let mut host = MockHost::with_url("/s");
        host.kind = ElementKind::Select;
        host.companion_supported = true;
        let engine = attach(host, &InstanceConfig::new()).expect("attach");
        assert!(engine.has_companion());
        assert!(engine.host().companion_created);
    }

    #[test]
    fn select_without_companion_support_fails() {
        let mut host = MockHost::with_url("/s");
        host.kind = ElementKind::Select;
        let err = attach(host, &InstanceConfig::new()).err().expect("rejected");
        assert!(matches!(
            err,
            TypeaheadError::Attach(AttachError::CompanionUnavailable { .. })
        ));
    }

    #[test]
    fn element_attributes_are_resolved_per_instance() {
        let mut host = MockHost::with_url("/s");
        host.attributes.insert(ATTR_LIMIT.to_string(), "-2".to_string());
        let engine = attach(host, &InstanceConfig::new().with_limit(5)).expect("attach");
        assert_eq!(engine.config().limit(), -2);
    }

    #[test]
    fn attach_all_skips_incompatible_elements() {
        let mut checkbox = MockHost::with_url("/s");
        checkbox.kind = ElementKind::Other("textarea".to_string());
        let engines = attach_all(
            vec![MockHost::with_url("/a"), checkbox, MockHost::with_url("/b")],
            &InstanceConfig::new(),
        )
        .expect("batch");
        let urls: Vec<_> = engines.iter().map(|e| e.config().url().map(str::to_string)).collect();
        assert_eq!(urls, vec![Some("/a".to_string()), Some("/b".to_string())]);
    }

    #[test]
    fn attach_all_fails_on_bad_mappings() {
        let instance = InstanceConfig::new().with_mappings(vec![MappingSpec {
            name: "Broken".to_string(),
            operator: None,
            behavior: "teleport".to_string(),
            conditions: Vec::new(),
        }]);
        let err = attach_all(vec![MockHost::with_url("/a")], &instance).err().expect("fatal");
        assert!(matches!(err, ConfigError::UnknownBehavior { .. }));
    }
}
