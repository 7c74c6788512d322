//! Formatted output helpers for CLI commands.

use mocknet_config::BasicService;

/// Formats the endpoint a service would answer on
/// (e.g., `http://localhost:8080/api`).
#[must_use]
pub fn format_endpoint(service: &BasicService) -> String {
    let host = if service.host.is_empty() {
        "localhost"
    } else {
        &service.host
    };

    let mut endpoint = if service.port == 0 {
        host.to_string()
    } else {
        format!("{host}:{}", service.port)
    };

    if !service.path.is_empty() {
        if !service.path.starts_with('/') {
            endpoint.push('/');
        }
        endpoint.push_str(&service.path);
    }

    if service.protocol.is_empty() {
        endpoint
    } else {
        format!("{}://{endpoint}", service.protocol)
    }
}

/// Renders a provenance chain, outermost derivation first
/// (e.g., `stack:web < template:base`).
#[must_use]
pub fn format_provenance(inherits: &[String]) -> String {
    inherits.join(" < ")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use super::*;

    fn service(host: &str, path: &str, port: u16, protocol: &str) -> BasicService {
        BasicService {
            name: "svc".into(),
            host: host.into(),
            path: path.into(),
            port,
            protocol: protocol.into(),
            protocol_attrs: BTreeMap::new(),
            handler: None,
            file: PathBuf::new(),
            inherits: Vec::new(),
        }
    }

    #[test]
    fn format_endpoint_defaults_host() {
        assert_eq!(format_endpoint(&service("", "", 8080, "")), "localhost:8080");
    }

    #[test]
    fn format_endpoint_omits_unset_port() {
        assert_eq!(format_endpoint(&service("0.0.0.0", "", 0, "")), "0.0.0.0");
    }

    #[test]
    fn format_endpoint_includes_protocol_and_path() {
        assert_eq!(
            format_endpoint(&service("api.local", "/v1", 443, "https")),
            "https://api.local:443/v1"
        );
    }

    #[test]
    fn format_endpoint_inserts_path_separator() {
        assert_eq!(
            format_endpoint(&service("", "health", 80, "")),
            "localhost:80/health"
        );
    }

    #[test]
    fn format_provenance_joins_tags() {
        let inherits = vec!["stack:web".to_string(), "template:base".to_string()];
        assert_eq!(format_provenance(&inherits), "stack:web < template:base");
    }

    #[test]
    fn format_provenance_of_empty_chain() {
        assert_eq!(format_provenance(&[]), "");
    }
}
