//! Document loader: decodes one YAML configuration file into the
//! document model.
//!
//! Decoding happens in two phases: `serde_yaml` turns the raw text into a
//! generic value tree, then an explicit per-field walk transforms and
//! validates each recognized key. Unrecognized keys on service items are
//! not rejected — they are absorbed verbatim into `protocol_attrs`, which
//! is how protocol-specific configuration travels without a closed schema.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use mocknet_common::constants::{CURRENT_VERSION, SUPPORTED_VERSIONS};
use mocknet_common::error::{ConfigError, Result};

use crate::document::{
    BasicService, Document, ImportItem, ServiceItem, StackItem, StackRef, TemplateService,
};
use crate::handler::HandlerRef;

/// Loads a configuration document from its source text.
///
/// `cwd` is the directory relative import paths are resolved against;
/// `file` is the originating file identity (may be empty for in-memory
/// documents).
///
/// # Errors
///
/// Returns an error if the text is not valid YAML, a required field is
/// missing, a field has the wrong shape, or the declared version is
/// unsupported.
pub fn load_document(text: &str, cwd: &Path, file: &Path) -> Result<Document> {
    tracing::debug!(file = %file.display(), "loading configuration document");

    let value: Value = serde_yaml::from_str(text).map_err(|err| ConfigError::Parse {
        message: err.to_string(),
        file: file.to_path_buf(),
    })?;

    let mut document = Document {
        cwd: cwd.to_path_buf(),
        file: file.to_path_buf(),
        version: CURRENT_VERSION,
        imports: Vec::new(),
        stacks: Vec::new(),
        services: Vec::new(),
    };

    let mapping = match value {
        // An empty file is a valid, empty document.
        Value::Null => return Ok(document),
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(schema(
                file,
                format!("expected a mapping at the top level, got {}", kind_of(&other)),
            ));
        }
    };

    for (key, value) in &mapping {
        match expect_key(key, file)? {
            "version" => document.version = load_version(value, file)?,
            "imports" => {
                for item in expect_sequence(value, "imports", file)? {
                    document.imports.push(load_import(item, cwd, file)?);
                }
            }
            "stacks" => {
                for item in expect_sequence(value, "stacks", file)? {
                    document.stacks.push(load_stack(item, file)?);
                }
            }
            "services" => {
                for item in expect_sequence(value, "services", file)? {
                    document.services.push(load_service(item, cwd, file)?);
                }
            }
            other => {
                return Err(schema(file, format!("unknown top-level key '{other}'")));
            }
        }
    }

    Ok(document)
}

fn schema(file: &Path, message: String) -> ConfigError {
    ConfigError::Schema {
        message,
        file: file.to_path_buf(),
    }
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

fn expect_key<'a>(key: &'a Value, file: &Path) -> Result<&'a str> {
    key.as_str()
        .ok_or_else(|| schema(file, format!("mapping keys should be strings, got {}", kind_of(key))))
}

fn expect_sequence<'a>(value: &'a Value, field: &str, file: &Path) -> Result<&'a Vec<Value>> {
    value
        .as_sequence()
        .ok_or_else(|| schema(file, format!("'{field}' should be a sequence")))
}

fn expect_string(value: &Value, field: &str, file: &Path) -> Result<String> {
    value
        .as_str()
        .map(ToOwned::to_owned)
        .ok_or_else(|| schema(file, format!("'{field}' should be a string")))
}

fn expect_name(value: &Value, field: &str, file: &Path) -> Result<String> {
    let name = expect_string(value, field, file)?;
    if name.is_empty() {
        return Err(schema(file, format!("'{field}' should be a non-empty string")));
    }
    Ok(name)
}

fn expect_port(value: &Value, file: &Path) -> Result<u16> {
    value
        .as_i64()
        .and_then(|port| u16::try_from(port).ok())
        .ok_or_else(|| {
            schema(
                file,
                "'port' should be an integer in the range of [0, 65535]".into(),
            )
        })
}

fn load_version(value: &Value, file: &Path) -> Result<i64> {
    let version = value
        .as_i64()
        .ok_or_else(|| schema(file, "'version' should be an integer".into()))?;
    if !SUPPORTED_VERSIONS.contains(&version) {
        return Err(ConfigError::UnsupportedVersion {
            version,
            file: file.to_path_buf(),
        });
    }
    Ok(version)
}

fn load_import(value: &Value, cwd: &Path, file: &Path) -> Result<ImportItem> {
    let (raw_path, name) = match value {
        Value::String(path) => (path.clone(), None),
        Value::Mapping(mapping) => load_import_spec(mapping, file)?,
        other => {
            return Err(schema(
                file,
                format!(
                    "import entries should be path strings or mappings, got {}",
                    kind_of(other)
                ),
            ));
        }
    };

    let joined = if Path::new(&raw_path).is_absolute() {
        PathBuf::from(&raw_path)
    } else {
        cwd.join(&raw_path)
    };
    let path = joined.canonicalize().map_err(|source| ConfigError::Io {
        path: joined.clone(),
        source,
    })?;
    if !path.is_file() {
        return Err(schema(
            file,
            format!("import '{raw_path}' should point to a file"),
        ));
    }

    Ok(ImportItem {
        path,
        name,
        file: file.to_path_buf(),
    })
}

fn load_import_spec(mapping: &Mapping, file: &Path) -> Result<(String, Option<String>)> {
    let mut path = None;
    let mut name = None;
    for (key, value) in mapping {
        match expect_key(key, file)? {
            "path" => path = Some(expect_name(value, "path", file)?),
            "name" => name = Some(expect_name(value, "name", file)?),
            other => {
                return Err(schema(file, format!("unknown import key '{other}'")));
            }
        }
    }
    let path = path.ok_or_else(|| schema(file, "import is missing required field 'path'".into()))?;
    Ok((path, name))
}

fn load_stack(value: &Value, file: &Path) -> Result<StackItem> {
    let mapping = value
        .as_mapping()
        .ok_or_else(|| schema(file, "stack entries should be mappings".into()))?;

    let mut name = None;
    let mut services = Vec::new();
    for (key, value) in mapping {
        match expect_key(key, file)? {
            "name" => name = Some(expect_name(value, "name", file)?),
            "services" => {
                for item in expect_sequence(value, "services", file)? {
                    services.push(expect_name(item, "stack service", file)?);
                }
            }
            other => {
                return Err(schema(file, format!("unknown stack key '{other}'")));
            }
        }
    }

    let name = name.ok_or_else(|| schema(file, "stack is missing required field 'name'".into()))?;
    Ok(StackItem {
        name,
        services,
        file: file.to_path_buf(),
    })
}

/// Selects the service-item variant. The probe order is a disambiguation
/// rule on overlapping field sets and must stay: stack, then template,
/// then basic.
fn load_service(value: &Value, cwd: &Path, file: &Path) -> Result<ServiceItem> {
    let mapping = value.as_mapping().ok_or_else(|| {
        schema(
            file,
            format!("service entries should be mappings, got {}", kind_of(value)),
        )
    })?;

    let mut has_stack = false;
    let mut has_template = false;
    let mut has_name = false;
    for (key, _) in mapping {
        match key.as_str() {
            Some("stack") => has_stack = true,
            Some("template") => has_template = true,
            Some("name") => has_name = true,
            _ => {}
        }
    }

    if has_stack {
        return Ok(ServiceItem::Stack(load_stack_ref(mapping, file)?));
    }
    if has_template && has_name {
        return Ok(ServiceItem::Template(load_template_service(
            mapping, cwd, file,
        )?));
    }
    if has_name {
        return Ok(ServiceItem::Basic(load_basic_service(mapping, cwd, file)?));
    }

    let rendered = serde_yaml::to_string(value)
        .map_or_else(|_| String::from("<unrepresentable>"), |s| s.trim_end().to_string());
    Err(schema(
        file,
        format!("unrecognizable service definition: {rendered}"),
    ))
}

fn load_stack_ref(mapping: &Mapping, file: &Path) -> Result<StackRef> {
    let mut stack = None;
    for (key, value) in mapping {
        match expect_key(key, file)? {
            "stack" => stack = Some(expect_name(value, "stack", file)?),
            other => {
                return Err(schema(
                    file,
                    format!("unknown key '{other}' on stack reference"),
                ));
            }
        }
    }
    let stack = stack.ok_or_else(|| schema(file, "'stack' should be a non-empty string".into()))?;
    Ok(StackRef {
        stack,
        file: file.to_path_buf(),
        inherits: Vec::new(),
    })
}

fn load_basic_service(mapping: &Mapping, cwd: &Path, file: &Path) -> Result<BasicService> {
    let mut service = BasicService {
        name: String::new(),
        host: String::new(),
        path: String::new(),
        port: 0,
        protocol: String::new(),
        protocol_attrs: BTreeMap::new(),
        handler: None,
        file: file.to_path_buf(),
        inherits: Vec::new(),
    };

    for (key, value) in mapping {
        match expect_key(key, file)? {
            "name" => service.name = expect_name(value, "name", file)?,
            "host" => service.host = expect_string(value, "host", file)?,
            "path" => service.path = expect_string(value, "path", file)?,
            "port" => service.port = expect_port(value, file)?,
            "protocol" => service.protocol = expect_string(value, "protocol", file)?,
            "protocol_attrs" => merge_protocol_attrs(&mut service.protocol_attrs, value, file)?,
            "handler" => {
                service.handler = Some(HandlerRef::new(cwd, expect_name(value, "handler", file)?));
            }
            "inherits" => service.inherits = load_inherits(value, file)?,
            other => {
                let _ = service.protocol_attrs.insert(other.to_owned(), value.clone());
            }
        }
    }

    Ok(service)
}

fn load_template_service(mapping: &Mapping, cwd: &Path, file: &Path) -> Result<TemplateService> {
    let mut service = TemplateService {
        name: String::new(),
        template: String::new(),
        host: String::new(),
        path: String::new(),
        port: 0,
        protocol: String::new(),
        protocol_attrs: BTreeMap::new(),
        handler: None,
        file: file.to_path_buf(),
        inherits: Vec::new(),
    };

    for (key, value) in mapping {
        match expect_key(key, file)? {
            "name" => service.name = expect_name(value, "name", file)?,
            "template" => service.template = expect_name(value, "template", file)?,
            "host" => service.host = expect_string(value, "host", file)?,
            "path" => service.path = expect_string(value, "path", file)?,
            "port" => service.port = expect_port(value, file)?,
            "protocol" => service.protocol = expect_string(value, "protocol", file)?,
            "protocol_attrs" => merge_protocol_attrs(&mut service.protocol_attrs, value, file)?,
            "handler" => {
                service.handler = Some(HandlerRef::new(cwd, expect_name(value, "handler", file)?));
            }
            "inherits" => service.inherits = load_inherits(value, file)?,
            other => {
                let _ = service.protocol_attrs.insert(other.to_owned(), value.clone());
            }
        }
    }

    Ok(service)
}

/// A declared provenance chain; expansion tags are prepended to it.
fn load_inherits(value: &Value, file: &Path) -> Result<Vec<String>> {
    expect_sequence(value, "inherits", file)?
        .iter()
        .map(|item| expect_string(item, "inherits", file))
        .collect()
}

fn merge_protocol_attrs(
    attrs: &mut BTreeMap<String, Value>,
    value: &Value,
    file: &Path,
) -> Result<()> {
    if value.is_null() {
        return Ok(());
    }
    let mapping = value
        .as_mapping()
        .ok_or_else(|| schema(file, "'protocol_attrs' should be a mapping".into()))?;
    for (key, value) in mapping {
        let _ = attrs.insert(expect_key(key, file)?.to_owned(), value.clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn load(text: &str) -> Result<Document> {
        load_document(text, Path::new(""), Path::new(""))
    }

    #[test]
    fn load_empty_input() {
        let document = load("").expect("should load empty input");
        assert_eq!(document.version, CURRENT_VERSION);
        assert!(document.imports.is_empty());
        assert!(document.stacks.is_empty());
        assert!(document.services.is_empty());
    }

    #[test]
    fn load_rejects_non_mapping_top_level() {
        let err = load("- just\n- a\n- list\n").unwrap_err();
        assert!(err.to_string().contains("top level"), "got: {err}");
    }

    #[test]
    fn load_rejects_unknown_top_level_key() {
        let err = load("bogus: 1\n").unwrap_err();
        assert!(err.to_string().contains("bogus"), "got: {err}");
    }

    #[test]
    fn load_accepts_current_version() {
        let document = load("version: 0\n").expect("should load");
        assert_eq!(document.version, 0);
    }

    #[test]
    fn load_rejects_unsupported_version() {
        let err = load("version: 7\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnsupportedVersion { version: 7, .. }
        ));
    }

    #[test]
    fn load_rejects_non_integer_version() {
        let err = load("version: zero\n").unwrap_err();
        assert!(err.to_string().contains("integer"), "got: {err}");
    }

    #[test]
    fn load_basic_service_fields() {
        let document = load(
            "services:\n  - name: api\n    host: 0.0.0.0\n    path: /v1\n    port: 8080\n    protocol: http\n",
        )
        .expect("should load");
        assert_eq!(document.services.len(), 1);
        let ServiceItem::Basic(service) = &document.services[0] else {
            unreachable!("expected a basic service");
        };
        assert_eq!(service.name, "api");
        assert_eq!(service.host, "0.0.0.0");
        assert_eq!(service.path, "/v1");
        assert_eq!(service.port, 8080);
        assert_eq!(service.protocol, "http");
        assert!(service.protocol_attrs.is_empty());
    }

    #[test]
    fn unrecognized_service_fields_land_in_protocol_attrs() {
        let document = load(
            "services:\n  - name: queue\n    protocol: amqp\n    exchange: events\n    durable: true\n",
        )
        .expect("should load");
        let ServiceItem::Basic(service) = &document.services[0] else {
            unreachable!("expected a basic service");
        };
        assert_eq!(service.protocol_attrs.len(), 2);
        assert_eq!(
            service.protocol_attrs.get("exchange").and_then(Value::as_str),
            Some("events")
        );
        assert_eq!(
            service.protocol_attrs.get("durable").and_then(Value::as_bool),
            Some(true)
        );
    }

    #[test]
    fn explicit_protocol_attrs_merge_with_absorbed_fields() {
        let document = load(
            "services:\n  - name: queue\n    protocol_attrs:\n      vhost: /\n    exchange: events\n",
        )
        .expect("should load");
        let ServiceItem::Basic(service) = &document.services[0] else {
            unreachable!("expected a basic service");
        };
        assert_eq!(service.protocol_attrs.len(), 2);
        assert!(service.protocol_attrs.contains_key("vhost"));
        assert!(service.protocol_attrs.contains_key("exchange"));
    }

    #[test]
    fn declared_inherits_is_a_provenance_chain_not_an_attr() {
        let document = load(
            "services:\n  - name: api\n    inherits:\n      - template:base\n",
        )
        .expect("should load");
        let ServiceItem::Basic(service) = &document.services[0] else {
            unreachable!("expected a basic service");
        };
        assert_eq!(service.inherits, vec!["template:base".to_owned()]);
        assert!(service.protocol_attrs.is_empty());
    }

    #[test]
    fn declared_inherits_rejects_non_string_entries() {
        let err = load("services:\n  - name: api\n    inherits:\n      - 7\n").unwrap_err();
        assert!(err.to_string().contains("inherits"), "got: {err}");
    }

    #[test]
    fn service_with_stack_key_is_a_stack_reference() {
        let document = load("services:\n  - stack: web\n").expect("should load");
        assert!(matches!(
            &document.services[0],
            ServiceItem::Stack(StackRef { stack, .. }) if stack == "web"
        ));
    }

    #[test]
    fn service_with_template_and_name_is_a_template() {
        let document =
            load("services:\n  - name: derived\n    template: base\n    port: 9090\n")
                .expect("should load");
        let ServiceItem::Template(service) = &document.services[0] else {
            unreachable!("expected a template service");
        };
        assert_eq!(service.name, "derived");
        assert_eq!(service.template, "base");
        assert_eq!(service.port, 9090);
    }

    #[test]
    fn service_with_template_but_no_name_is_rejected() {
        let err = load("services:\n  - template: base\n").unwrap_err();
        assert!(
            err.to_string().contains("unrecognizable service definition"),
            "got: {err}"
        );
    }

    #[test]
    fn service_without_any_discriminant_is_rejected_with_content() {
        let err = load("services:\n  - port: 80\n").unwrap_err();
        assert!(err.to_string().contains("port"), "got: {err}");
    }

    #[test]
    fn stack_reference_rejects_extra_keys() {
        let err = load("services:\n  - stack: web\n    port: 80\n").unwrap_err();
        assert!(err.to_string().contains("stack reference"), "got: {err}");
    }

    #[test]
    fn load_rejects_empty_service_name() {
        let err = load("services:\n  - name: \"\"\n").unwrap_err();
        assert!(err.to_string().contains("non-empty"), "got: {err}");
    }

    #[test]
    fn load_rejects_out_of_range_port() {
        let err = load("services:\n  - name: api\n    port: 70000\n").unwrap_err();
        assert!(err.to_string().contains("65535"), "got: {err}");
    }

    #[test]
    fn load_rejects_non_string_protocol() {
        let err = load("services:\n  - name: api\n    protocol: 80\n").unwrap_err();
        assert!(err.to_string().contains("protocol"), "got: {err}");
    }

    #[test]
    fn load_stack_definitions() {
        let document = load("stacks:\n  - name: web\n    services: [svc1, svc2]\n")
            .expect("should load");
        assert_eq!(document.stacks.len(), 1);
        assert_eq!(document.stacks[0].name, "web");
        assert_eq!(document.stacks[0].services, vec!["svc1", "svc2"]);
    }

    #[test]
    fn load_rejects_stack_without_name() {
        let err = load("stacks:\n  - services: [svc1]\n").unwrap_err();
        assert!(err.to_string().contains("name"), "got: {err}");
    }

    #[test]
    fn load_bare_and_aliased_imports() {
        let dir = tempfile::tempdir().expect("should create tempdir");
        std::fs::write(dir.path().join("base.yml"), "version: 0\n").expect("should write");

        let text = "imports:\n  - base.yml\n  - path: base.yml\n    name: base\n";
        let document =
            load_document(text, dir.path(), Path::new("")).expect("should load imports");
        assert_eq!(document.imports.len(), 2);
        assert!(document.imports[0].name.is_none());
        assert_eq!(document.imports[1].name.as_deref(), Some("base"));
        // Both spellings resolve to the same canonical file.
        assert_eq!(document.imports[0], document.imports[1]);
    }

    #[test]
    fn load_rejects_missing_import_file() {
        let dir = tempfile::tempdir().expect("should create tempdir");
        let err = load_document("imports:\n  - ghost.yml\n", dir.path(), Path::new(""))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }), "got: {err}");
    }

    #[test]
    fn load_handler_is_tied_to_document_directory() {
        let dir = tempfile::tempdir().expect("should create tempdir");
        let document = load_document(
            "services:\n  - name: api\n    handler: mocknet.handler.api\n",
            dir.path(),
            Path::new(""),
        )
        .expect("should load");
        let ServiceItem::Basic(service) = &document.services[0] else {
            unreachable!("expected a basic service");
        };
        let handler = service.handler.as_ref().expect("handler should be set");
        assert_eq!(handler.base_dir(), dir.path());
        assert_eq!(handler.name(), "mocknet.handler.api");
    }
}
