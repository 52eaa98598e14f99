//! Translation engine
//!
//! Entry point for GET translation: resolve the request path against
//! the schema index, walk the subtree, and assemble the nested JSON
//! result. The context is immutable and shareable across concurrent
//! requests; every call owns a fresh per-request snapshot, so two
//! translations of the same path against an unmodified store yield
//! identical results.

mod assemble;
mod traverse;

use log::warn;
use serde_json::Value as JsonValue;

use crate::config::EngineConfig;
use crate::error::{Result, TranslateError};
use crate::keycodec;
use crate::path::{self, PathInfo};
use crate::schema::{NodeKind, SchemaIndex};
use crate::store::{DbId, Snapshot, StoreAccessor};
use crate::transform::{TransformRegistry, XfmrArgs};
use crate::value::JsonMap;

use traverse::Walk;

/// Immutable per-process translation context, shared by reference
/// across requests
pub struct TranslateContext<'a> {
    /// Schema index produced at load time
    pub schema: &'a SchemaIndex,

    /// Transform registry populated at startup
    pub registry: &'a TransformRegistry,

    /// Store accessor
    pub store: &'a dyn StoreAccessor,

    /// Engine configuration
    pub config: EngineConfig,
}

/// Key restriction applied when the request pins list instances
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum KeyFilter {
    /// The request names every key leaf: exactly one store key
    Exact(String),

    /// The request names a leading subset of key leaves
    Prefix(String),
}

/// Resolved store addressing for the request target
#[derive(Debug, Default)]
struct Target {
    db: DbId,
    table: Option<String>,
    key: Option<String>,
    list_filter: Option<KeyFilter>,
}

/// Walk the request path from the root, accumulating the nearest
/// backing table (static, fixed-key, or via indirection transform) and
/// the composite store key derived from list predicates.
fn resolve_target(
    ctx: &TranslateContext<'_>,
    snap: &mut Snapshot,
    info: &PathInfo,
    request_uri: &str,
) -> Result<Target> {
    let mut target = Target::default();
    let mut cur_xpath = String::new();
    let mut cur_uri = String::new();
    let segments = info.segments();

    for (idx, seg) in segments.iter().enumerate() {
        let is_last = idx == segments.len() - 1;
        cur_xpath.push('/');
        cur_xpath.push_str(&seg.name);
        cur_uri.push('/');
        cur_uri.push_str(&seg.name);
        for (k, v) in &seg.predicates {
            cur_uri.push('[');
            cur_uri.push_str(k);
            cur_uri.push('=');
            cur_uri.push_str(v);
            cur_uri.push(']');
        }

        let node = ctx.schema.require(&cur_xpath)?;
        target.db = node.db;
        if let Some(t) = &node.table {
            target.table = Some(t.clone());
        }
        if let Some(k) = &node.key_name {
            target.key = Some(k.clone());
        }

        // a target list runs its own indirection during enumeration
        if !(is_last && node.kind == NodeKind::List) {
            if let Some(name) = &node.table_transform {
                let f = ctx.registry.table(name)?;
                let args = XfmrArgs {
                    db: target.db,
                    uri: &cur_uri,
                    request_uri,
                    table: target.table.as_deref(),
                    key: target.key.as_deref(),
                    store: ctx.store,
                    config: &ctx.config,
                };
                if let Some(t) = f(&args, snap)?.into_iter().next() {
                    target.table = Some(t);
                }
            }
        }

        if node.kind == NodeKind::List && !seg.predicates.is_empty() {
            let (prefix, covered) = keycodec::derive_partial_store_key(
                ctx.schema,
                ctx.registry,
                &ctx.config,
                &cur_xpath,
                &seg.predicates,
            )?;
            if covered == node.key_leafs.len() {
                if is_last {
                    target.list_filter = Some(KeyFilter::Exact(prefix.clone()));
                }
                target.key = Some(prefix);
            } else if is_last && covered > 0 {
                let mut partial = prefix;
                partial.push(ctx.config.key_separator);
                target.list_filter = Some(KeyFilter::Prefix(partial));
            } else {
                return Err(TranslateError::KeyCodecError(format!(
                    "incomplete key predicates for {}",
                    cur_xpath
                )));
            }
        }
    }
    Ok(target)
}

fn target_args<'s>(
    ctx: &'s TranslateContext<'_>,
    db: DbId,
    request_uri: &'s str,
    table: Option<&'s str>,
    key: Option<&'s str>,
) -> XfmrArgs<'s> {
    XfmrArgs {
        db,
        uri: request_uri,
        request_uri,
        table,
        key,
        store: ctx.store,
        config: &ctx.config,
    }
}

/// Translate one GET request into its nested JSON result.
///
/// A request resolving to no data yields an empty object, except when
/// it targets a single scalar leaf or a single list instance, where
/// absence is reported as [`TranslateError::NotFound`].
pub fn translate_get(ctx: &TranslateContext<'_>, request_uri: &str) -> Result<JsonValue> {
    let info = PathInfo::parse(request_uri);
    let xpath = info.xpath();
    let node = ctx.schema.require(&xpath)?;
    let mut snap = Snapshot::new();
    let target = resolve_target(ctx, &mut snap, &info, request_uri)?;
    let walk = Walk { ctx, request_uri };

    if let Some(name) = &node.validate_transform {
        let gate = ctx.registry.validate(name)?;
        let args = target_args(ctx, node.db, request_uri, target.table.as_deref(), target.key.as_deref());
        if !gate(&args, &mut snap) {
            return match node.kind {
                NodeKind::Leaf | NodeKind::LeafList => {
                    Err(TranslateError::NotFound(request_uri.to_string()))
                }
                _ => Ok(JsonValue::Object(JsonMap::new())),
            };
        }
    }

    match node.kind {
        NodeKind::Leaf | NodeKind::LeafList => {
            if let Some(name) = &node.subtree_transform {
                // the override performs its own existence check
                let f = ctx.registry.subtree(name)?;
                let args = target_args(ctx, node.db, request_uri, target.table.as_deref(), target.key.as_deref());
                let frag = f(&args, &mut snap)?;
                if frag.is_empty()
                    && (node.kind == NodeKind::Leaf || path::has_instance_predicate(request_uri))
                {
                    return Err(TranslateError::NotFound(request_uri.to_string()));
                }
                return Ok(JsonValue::Object(frag));
            }
            let fields = walk.terminal_fill(
                &mut snap,
                request_uri,
                &xpath,
                node.db,
                target.table.as_deref(),
                target.key.as_deref(),
            )?;
            if fields.is_empty() && node.kind == NodeKind::Leaf {
                return Err(TranslateError::NotFound(request_uri.to_string()));
            }
            Ok(JsonValue::Object(fields))
        }
        NodeKind::Container | NodeKind::Choice | NodeKind::Case => {
            let mut result = JsonMap::new();
            let mut override_name: Option<&str> = None;
            if let Some(name) = node.subtree_transform.as_deref() {
                let f = ctx.registry.subtree(name)?;
                let args = target_args(ctx, node.db, request_uri, target.table.as_deref(), target.key.as_deref());
                let frag = f(&args, &mut snap)?;
                assemble::merge_fields(&mut result, frag);
                override_name = Some(name);
                if !node.has_child_subtree {
                    // an empty object is a valid result for the exact
                    // container target
                    return Ok(JsonValue::Object(result));
                }
            }
            let descended = walk.container_fill(
                &mut snap,
                request_uri,
                &xpath,
                target.table.as_deref(),
                target.key.as_deref(),
                override_name,
            )?;
            assemble::merge_fields(&mut result, descended);
            Ok(JsonValue::Object(result))
        }
        NodeKind::List => {
            let instance_query = path::has_instance_predicate(request_uri);
            let collection_uri = path::without_trailing_predicates(request_uri);
            let mut result = JsonMap::new();
            let mut override_name: Option<&str> = None;
            if let Some(name) = node.subtree_transform.as_deref() {
                let f = ctx.registry.subtree(name)?;
                let args = target_args(ctx, node.db, request_uri, target.table.as_deref(), target.key.as_deref());
                match f(&args, &mut snap) {
                    Ok(frag) => assemble::merge_fields(&mut result, frag),
                    Err(err) if instance_query => return Err(err),
                    Err(err) => warn!("subtree transform {} failed for {}: {}", name, request_uri, err),
                }
                override_name = Some(name);
                if !node.has_child_subtree {
                    if instance_query && result.is_empty() {
                        return Err(TranslateError::NotFound(request_uri.to_string()));
                    }
                    return Ok(JsonValue::Object(result));
                }
            }
            let instances = walk.list_fill(
                &mut snap,
                collection_uri,
                &xpath,
                target.list_filter.as_ref(),
                override_name,
            )?;
            let list_name = path::last_segment(&xpath).to_string();
            assemble::attach_list(&mut result, &list_name, instances, instance_query);
            if instance_query && result.is_empty() {
                return Err(TranslateError::NotFound(request_uri.to_string()));
            }
            Ok(JsonValue::Object(result))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Strictness;
    use crate::schema::SchemaNode;
    use crate::store::MemStore;
    use crate::value::ScalarKind;
    use serde_json::json;

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Sampling schema modeled on an sFlow-style feature: a fixed-key
    /// settings table plus a collector list resolved via table
    /// indirection.
    fn sampling_fixture() -> (SchemaIndex, TransformRegistry, MemStore) {
        let schema = SchemaIndex::builder()
            .node("/sampling", SchemaNode::container())
            .node(
                "/sampling/sflow",
                SchemaNode::container().with_table("SFLOW").with_key_name("global"),
            )
            .node(
                "/sampling/sflow/enabled",
                SchemaNode::leaf(ScalarKind::Bool).with_field("enabled"),
            )
            .node(
                "/sampling/sflow/polling-interval",
                SchemaNode::leaf(ScalarKind::Uint16).with_field("polling_interval"),
            )
            .node(
                "/sampling/sflow/agent",
                SchemaNode::leaf(ScalarKind::String).with_field("agent_id"),
            )
            .node("/sampling/sflow/collectors", SchemaNode::container())
            .node(
                "/sampling/sflow/collectors/collector",
                SchemaNode::list(&["address", "port", "vrf"])
                    .with_table_transform("sflow_collector_tbl"),
            )
            .node(
                "/sampling/sflow/collectors/collector/address",
                SchemaNode::leaf(ScalarKind::String).key(),
            )
            .node(
                "/sampling/sflow/collectors/collector/port",
                SchemaNode::leaf(ScalarKind::Uint16).key(),
            )
            .node(
                "/sampling/sflow/collectors/collector/vrf",
                SchemaNode::leaf(ScalarKind::String).key(),
            )
            .build();

        let mut registry = TransformRegistry::new();
        registry.bind_table("sflow_collector_tbl", |_args, _snap| {
            Ok(vec!["SFLOW_COLLECTOR".to_string()])
        });

        let mut store = MemStore::new();
        store.set_entry(
            DbId::Config,
            "SFLOW",
            "global",
            &[("enabled", "true"), ("polling_interval", "20"), ("agent_id", "Ethernet0")],
        );
        store.set_entry(DbId::Config, "SFLOW_COLLECTOR", "10.0.0.1|6343|default", &[]);

        (schema, registry, store)
    }

    fn ctx<'a>(
        schema: &'a SchemaIndex,
        registry: &'a TransformRegistry,
        store: &'a MemStore,
    ) -> TranslateContext<'a> {
        TranslateContext {
            schema,
            registry,
            store,
            config: EngineConfig::default(),
        }
    }

    #[test]
    fn test_list_collection_renders_array() {
        init_logs();
        let (schema, registry, store) = sampling_fixture();
        let ctx = ctx(&schema, &registry, &store);

        let result = translate_get(&ctx, "/sampling/sflow/collectors/collector").unwrap();
        assert_eq!(
            result,
            json!({
                "collector": [
                    {"address": "10.0.0.1", "port": 6343, "vrf": "default"}
                ]
            })
        );
    }

    #[test]
    fn test_container_above_list() {
        let (schema, registry, store) = sampling_fixture();
        let ctx = ctx(&schema, &registry, &store);

        let result = translate_get(&ctx, "/sampling/sflow/collectors").unwrap();
        assert_eq!(
            result,
            json!({
                "collector": [
                    {"address": "10.0.0.1", "port": 6343, "vrf": "default"}
                ]
            })
        );
    }

    #[test]
    fn test_list_instance_query_flattens() {
        let (schema, registry, store) = sampling_fixture();
        let ctx = ctx(&schema, &registry, &store);

        let result = translate_get(
            &ctx,
            "/sampling/sflow/collectors/collector[address=10.0.0.1][port=6343][vrf=default]",
        )
        .unwrap();
        assert_eq!(
            result,
            json!({"address": "10.0.0.1", "port": 6343, "vrf": "default"})
        );
    }

    #[test]
    fn test_missing_list_instance_is_not_found() {
        let (schema, registry, store) = sampling_fixture();
        let ctx = ctx(&schema, &registry, &store);

        let err = translate_get(
            &ctx,
            "/sampling/sflow/collectors/collector[address=10.9.9.9][port=6343][vrf=default]",
        )
        .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_fixed_key_container_get() {
        let (schema, registry, store) = sampling_fixture();
        let ctx = ctx(&schema, &registry, &store);

        let result = translate_get(&ctx, "/sampling/sflow").unwrap();
        assert_eq!(
            result,
            json!({
                "enabled": true,
                "polling-interval": 20,
                "agent": "Ethernet0",
                "collectors": {
                    "collector": [
                        {"address": "10.0.0.1", "port": 6343, "vrf": "default"}
                    ]
                }
            })
        );
    }

    #[test]
    fn test_leaf_target_get() {
        let (schema, registry, store) = sampling_fixture();
        let ctx = ctx(&schema, &registry, &store);

        let result = translate_get(&ctx, "/sampling/sflow/agent").unwrap();
        assert_eq!(result, json!({"agent": "Ethernet0"}));
    }

    #[test]
    fn test_traversal_is_idempotent() {
        let (schema, registry, store) = sampling_fixture();
        let ctx = ctx(&schema, &registry, &store);

        let first = translate_get(&ctx, "/sampling/sflow").unwrap();
        let second = translate_get(&ctx, "/sampling/sflow").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_path_is_schema_inconsistency() {
        let (schema, registry, store) = sampling_fixture();
        let ctx = ctx(&schema, &registry, &store);

        let err = translate_get(&ctx, "/sampling/netflow").unwrap_err();
        assert!(matches!(err, TranslateError::SchemaInconsistency(_)));
    }

    /// Device-state schema exercising default field mapping, leaf-lists
    /// and error escalation.
    fn system_fixture(store: MemStore) -> (SchemaIndex, TransformRegistry, MemStore) {
        let schema = SchemaIndex::builder()
            .node("/system", SchemaNode::container())
            .node(
                "/system/state",
                SchemaNode::container()
                    .with_table("DEVICE_METADATA")
                    .with_key_name("localhost"),
            )
            .node(
                "/system/state/hostname",
                SchemaNode::leaf(ScalarKind::String).with_field("hostname"),
            )
            .node(
                "/system/state/mtu",
                SchemaNode::leaf(ScalarKind::Uint16).with_field("mtu"),
            )
            .node(
                "/system/state/uptime",
                SchemaNode::leaf(ScalarKind::Uint64).with_field("uptime"),
            )
            .node(
                "/system/state/servers",
                SchemaNode::leaf_list(ScalarKind::String).with_field("servers"),
            )
            .build();

        (schema, TransformRegistry::new(), store)
    }

    #[test]
    fn test_container_omits_missing_leaves() {
        let mut store = MemStore::new();
        store.set_entry(
            DbId::Config,
            "DEVICE_METADATA",
            "localhost",
            &[("hostname", "switch1"), ("servers@", "a,b,c")],
        );
        let (schema, registry, store) = system_fixture(store);
        let ctx = ctx(&schema, &registry, &store);

        let result = translate_get(&ctx, "/system/state").unwrap();
        assert_eq!(
            result,
            json!({"hostname": "switch1", "servers": ["a", "b", "c"]})
        );
    }

    #[test]
    fn test_absent_leaf_target_escalates() {
        let mut store = MemStore::new();
        store.set_entry(DbId::Config, "DEVICE_METADATA", "localhost", &[("hostname", "switch1")]);
        let (schema, registry, store) = system_fixture(store);
        let ctx = ctx(&schema, &registry, &store);

        let err = translate_get(&ctx, "/system/state/uptime").unwrap_err();
        assert!(err.is_not_found());

        // the parent container simply omits the absent field
        let result = translate_get(&ctx, "/system/state").unwrap();
        assert_eq!(result, json!({"hostname": "switch1"}));
    }

    #[test]
    fn test_empty_container_shapes() {
        let (schema, registry, store) = system_fixture(MemStore::new());
        let ctx = ctx(&schema, &registry, &store);

        // exact target: empty object is a valid result
        let result = translate_get(&ctx, "/system/state").unwrap();
        assert_eq!(result, json!({}));

        // ancestor: the empty container is omitted entirely
        let result = translate_get(&ctx, "/system").unwrap();
        assert_eq!(result, json!({}));
    }

    #[test]
    fn test_type_error_policies() {
        init_logs();
        let mut store = MemStore::new();
        store.set_entry(
            DbId::Config,
            "DEVICE_METADATA",
            "localhost",
            &[("hostname", "switch1"), ("mtu", "70000")],
        );
        let (schema, registry, store) = system_fixture(store);

        // lenient: the malformed field degrades to absent
        let lenient = ctx(&schema, &registry, &store);
        let result = translate_get(&lenient, "/system/state").unwrap();
        assert_eq!(result, json!({"hostname": "switch1"}));

        // exact-target query escalates the coercion failure
        let err = translate_get(&lenient, "/system/state/mtu").unwrap_err();
        assert!(matches!(err, TranslateError::TypeError(_)));

        // strict: the sibling failure aborts the container
        let mut strict = ctx(&schema, &registry, &store);
        strict.config.strictness = Strictness::Strict;
        let err = translate_get(&strict, "/system/state").unwrap_err();
        assert!(matches!(err, TranslateError::TypeError(_)));
    }

    #[test]
    fn test_empty_leaf_list_field_decodes_to_empty_array() {
        let mut store = MemStore::new();
        store.set_entry(DbId::Config, "DEVICE_METADATA", "localhost", &[("servers@", "")]);
        let (schema, registry, store) = system_fixture(store);
        let ctx = ctx(&schema, &registry, &store);

        let result = translate_get(&ctx, "/system/state").unwrap();
        assert_eq!(result, json!({"servers": []}));
    }

    #[test]
    fn test_leaf_list_instance_membership() {
        let mut store = MemStore::new();
        store.set_entry(DbId::Config, "DEVICE_METADATA", "localhost", &[("servers@", "a,b,c")]);
        let (schema, registry, store) = system_fixture(store);
        let ctx = ctx(&schema, &registry, &store);

        let result = translate_get(&ctx, "/system/state/servers[servers=b]").unwrap();
        assert_eq!(result, json!({"servers": ["b"]}));

        let err = translate_get(&ctx, "/system/state/servers[servers=z]").unwrap_err();
        assert!(err.is_not_found());
    }

    /// Override and transform wiring: subtree short-circuit, coexisting
    /// child descent, field transforms, validate gating and choice
    /// transparency.
    fn transform_fixture() -> (SchemaIndex, TransformRegistry, MemStore) {
        let schema = SchemaIndex::builder()
            .node(
                "/stats",
                SchemaNode::container()
                    .with_table("COUNTERS")
                    .with_key_name("global")
                    .with_subtree_transform("stats_override"),
            )
            .node(
                "/stats/ignored",
                SchemaNode::leaf(ScalarKind::Uint32).with_field("ignored"),
            )
            .node(
                "/summary",
                SchemaNode::container()
                    .with_subtree_transform("summary_override")
                    .with_child_subtree(),
            )
            .node(
                "/summary/skipped",
                SchemaNode::leaf(ScalarKind::String).with_field("skipped"),
            )
            .node(
                "/summary/detail",
                SchemaNode::container().with_table("DETAIL").with_key_name("row"),
            )
            .node(
                "/summary/detail/count",
                SchemaNode::leaf(ScalarKind::Uint32).with_field("count"),
            )
            .node(
                "/proto",
                SchemaNode::container().with_table("PROTO").with_key_name("main"),
            )
            .node("/proto/transport", SchemaNode::choice())
            .node("/proto/transport/tcp", SchemaNode::case())
            .node(
                "/proto/transport/tcp/port",
                SchemaNode::leaf(ScalarKind::Uint16).with_field("port"),
            )
            .node(
                "/proto/transport/tcp/debug",
                SchemaNode::leaf(ScalarKind::String)
                    .with_field("debug")
                    .with_validate_transform("never_valid"),
            )
            .node(
                "/proto/transport/tcp/negotiated",
                SchemaNode::leaf(ScalarKind::Bool).with_field_transform("tcp_negotiated"),
            )
            .node(
                "/proto/transport/tcp/missing",
                SchemaNode::leaf(ScalarKind::String).with_field_transform("always_empty"),
            )
            .build();

        let mut registry = TransformRegistry::new();
        registry.bind_subtree("stats_override", |_args, _snap| {
            let mut map = JsonMap::new();
            map.insert("custom".to_string(), json!(7));
            Ok(map)
        });
        registry.bind_subtree("summary_override", |_args, _snap| {
            let mut map = JsonMap::new();
            map.insert("total".to_string(), json!(2));
            Ok(map)
        });
        registry.bind_field("tcp_negotiated", |_args, _snap| {
            let mut map = JsonMap::new();
            map.insert("negotiated".to_string(), json!(true));
            Ok(map)
        });
        registry.bind_field("always_empty", |_args, _snap| Ok(JsonMap::new()));
        registry.bind_validate("never_valid", |_args, _snap| false);

        let mut store = MemStore::new();
        store.set_entry(DbId::Config, "COUNTERS", "global", &[("ignored", "1")]);
        store.set_entry(DbId::Config, "DETAIL", "row", &[("count", "42")]);
        store.set_entry(
            DbId::Config,
            "PROTO",
            "main",
            &[("port", "8080"), ("debug", "verbose")],
        );

        (schema, registry, store)
    }

    #[test]
    fn test_subtree_override_short_circuits_default_mapping() {
        let (schema, registry, store) = transform_fixture();
        let ctx = ctx(&schema, &registry, &store);

        // the COUNTERS table is bound, but the override wins at this level
        let result = translate_get(&ctx, "/stats").unwrap();
        assert_eq!(result, json!({"custom": 7}));
    }

    #[test]
    fn test_subtree_override_coexists_with_child_descent() {
        let (schema, registry, store) = transform_fixture();
        let ctx = ctx(&schema, &registry, &store);

        // terminals at the override's own level are covered by it;
        // deeper containers still take the default descent
        let result = translate_get(&ctx, "/summary").unwrap();
        assert_eq!(result, json!({"total": 2, "detail": {"count": 42}}));
    }

    #[test]
    fn test_choice_and_case_are_transparent() {
        let (schema, registry, store) = transform_fixture();
        let ctx = ctx(&schema, &registry, &store);

        let result = translate_get(&ctx, "/proto").unwrap();
        assert_eq!(result, json!({"port": 8080, "negotiated": true}));
    }

    #[test]
    fn test_validate_transform_gates_children() {
        let (schema, registry, store) = transform_fixture();
        let ctx = ctx(&schema, &registry, &store);

        // "debug" is present in the store but gated out
        let result = translate_get(&ctx, "/proto").unwrap();
        assert!(result.get("debug").is_none());
    }

    #[test]
    fn test_field_transform_empty_target_is_not_found() {
        let (schema, registry, store) = transform_fixture();
        let ctx = ctx(&schema, &registry, &store);

        let err = translate_get(&ctx, "/proto/transport/tcp/missing").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_multi_table_list_concatenates_instances() {
        let schema = SchemaIndex::builder()
            .node("/relay", SchemaNode::container())
            .node(
                "/relay/interface",
                SchemaNode::list(&["name"]).with_table_transform("relay_intf_tbl"),
            )
            .node(
                "/relay/interface/name",
                SchemaNode::leaf(ScalarKind::String).key(),
            )
            .node(
                "/relay/interface/helper",
                SchemaNode::leaf(ScalarKind::String).with_field("helper"),
            )
            .build();

        let mut registry = TransformRegistry::new();
        registry.bind_table("relay_intf_tbl", |_args, _snap| {
            Ok(vec!["RELAY_INTF".to_string(), "RELAY_VLAN_INTF".to_string()])
        });

        let mut store = MemStore::new();
        store.set_entry(DbId::Config, "RELAY_INTF", "Ethernet0", &[("helper", "10.1.1.1")]);
        store.set_entry(DbId::Config, "RELAY_VLAN_INTF", "Vlan100", &[("helper", "10.2.2.2")]);

        let ctx = TranslateContext {
            schema: &schema,
            registry: &registry,
            store: &store,
            config: EngineConfig::default(),
        };
        let result = translate_get(&ctx, "/relay/interface").unwrap();
        assert_eq!(
            result,
            json!({
                "interface": [
                    {"name": "Ethernet0", "helper": "10.1.1.1"},
                    {"name": "Vlan100", "helper": "10.2.2.2"}
                ]
            })
        );
    }

    #[test]
    fn test_zero_tables_from_indirection_means_no_data() {
        let schema = SchemaIndex::builder()
            .node("/relay", SchemaNode::container())
            .node(
                "/relay/interface",
                SchemaNode::list(&["name"]).with_table_transform("no_tables"),
            )
            .node(
                "/relay/interface/name",
                SchemaNode::leaf(ScalarKind::String).key(),
            )
            .build();

        let mut registry = TransformRegistry::new();
        registry.bind_table("no_tables", |_args, _snap| Ok(Vec::new()));

        let store = MemStore::new();
        let ctx = TranslateContext {
            schema: &schema,
            registry: &registry,
            store: &store,
            config: EngineConfig::default(),
        };
        let result = translate_get(&ctx, "/relay/interface").unwrap();
        assert_eq!(result, json!({}));
    }

    #[test]
    fn test_malformed_store_key_skips_instance() {
        init_logs();
        let (schema, registry, mut store) = sampling_fixture();
        // a two-component key cannot satisfy the three declared key leaves
        store.set_entry(DbId::Config, "SFLOW_COLLECTOR", "bad|key", &[]);
        let ctx = ctx(&schema, &registry, &store);

        let result = translate_get(&ctx, "/sampling/sflow/collectors/collector").unwrap();
        assert_eq!(
            result,
            json!({
                "collector": [
                    {"address": "10.0.0.1", "port": 6343, "vrf": "default"}
                ]
            })
        );
    }
}
