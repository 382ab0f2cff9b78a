//! Layer 4: computational deployment.
//!
//! Generates code artifacts in four paradigms from layer 3 output, an API
//! definition and data schemas, then produces a deployment descriptor,
//! target-specific optimizations and a monitoring plan for each
//! configured target.

use std::str::FromStr;

use chrono::Utc;
use jals_types::{into_record, Record, RecordExt, Value};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::config::StageConfig;
use crate::error::{LayerError, LayerResult};
use crate::layer3::id_label;

// ── Deployment Target ────────────────────────────────────────────────

/// Platforms layer 4 can deploy to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentTarget {
    Web,
    Mobile,
    Cloud,
    Edge,
    Iot,
}

impl DeploymentTarget {
    pub const ALL: [DeploymentTarget; 5] = [
        Self::Web,
        Self::Mobile,
        Self::Cloud,
        Self::Edge,
        Self::Iot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Mobile => "mobile",
            Self::Cloud => "cloud",
            Self::Edge => "edge",
            Self::Iot => "iot",
        }
    }

    /// Platform descriptor for this target.
    pub fn descriptor(&self) -> Value {
        match self {
            Self::Web => json!({
                "platform": "web",
                "technologies": ["React", "Node.js", "WebGL"],
                "features": ["interactive_visualization", "real_time_processing"],
                "status": "deployed",
            }),
            Self::Mobile => json!({
                "platform": "mobile",
                "technologies": ["React Native", "TensorFlow Lite"],
                "app_stores": ["iOS App Store", "Google Play"],
                "features": ["offline_processing", "gesture_recognition"],
                "status": "deployed",
            }),
            Self::Cloud => json!({
                "platform": "cloud",
                "provider": "AWS",
                "services": ["Lambda", "API Gateway", "DynamoDB"],
                "scaling": "auto",
                "status": "deployed",
            }),
            Self::Edge => json!({
                "platform": "edge",
                "hardware": ["NVIDIA Jetson", "Intel NUC"],
                "features": ["low_latency", "local_processing"],
                "status": "deployed",
            }),
            Self::Iot => json!({
                "platform": "iot",
                "protocols": ["MQTT", "CoAP"],
                "devices": ["Raspberry Pi", "Arduino"],
                "features": ["sensor_integration", "mesh_networking"],
                "status": "deployed",
            }),
        }
    }

    /// Optimizations applied for this target.
    pub fn optimizations(&self) -> &'static [&'static str] {
        match self {
            Self::Web => &["code_splitting", "lazy_loading", "caching"],
            Self::Mobile => &["battery_optimization", "memory_management"],
            Self::Cloud => &["auto_scaling", "load_balancing"],
            Self::Edge => &["model_quantization", "pruning"],
            Self::Iot => &["power_management", "compression"],
        }
    }
}

impl FromStr for DeploymentTarget {
    type Err = LayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| LayerError::UnknownTarget(s.to_string()))
    }
}

impl std::fmt::Display for DeploymentTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Deployer ─────────────────────────────────────────────────────────

/// Stateless layer 4 stage.
#[derive(Clone, Debug, Default)]
pub struct ComputationalDeployer {
    config: StageConfig,
}

impl ComputationalDeployer {
    pub fn new(config: StageConfig) -> Self {
        Self { config }
    }

    pub fn targets(&self) -> &[DeploymentTarget] {
        &self.config.deployment_targets
    }

    /// Deploy layer 3 output to every configured target.
    pub fn deploy(&self, layer3: &Record) -> LayerResult<Record> {
        let units = layer3.list("linguistic_units");
        let network = layer3.object_or_empty("semantic_network");

        let ids = units
            .iter()
            .map(|u| {
                u.get("id")
                    .filter(|id| !id.is_null())
                    .map(id_label)
                    .ok_or_else(|| LayerError::MissingField("id".into()))
            })
            .collect::<LayerResult<Vec<_>>>()?;

        let executable_code = compile(&ids, &network);
        let mut deployment_results = Record::new();
        let mut optimized_systems = Record::new();
        for target in self.targets() {
            let descriptor = target.descriptor();
            optimized_systems.insert(
                target.as_str().into(),
                json!({
                    "original": descriptor,
                    "optimizations": target.optimizations(),
                    "performance_improvements": {
                        "latency_reduction": 0.3,
                        "throughput_increase": 0.25,
                        "memory_usage_reduction": 0.2,
                        "energy_efficiency_improvement": 0.15,
                    }
                }),
            );
            deployment_results.insert(target.as_str().into(), descriptor);
        }

        debug!(units = ids.len(), targets = self.targets().len(), "deployment generated");

        Ok(into_record(json!({
            "executable_code": executable_code,
            "monitoring_data": monitoring_plan(&optimized_systems),
            "deployment_results": deployment_results,
            "optimized_systems": optimized_systems,
            "metadata": layer3.object_or_empty("metadata"),
            "deployment_metadata": {
                "layer": "computational_deployment",
                "version": "1.0",
                "timestamp": Utc::now().to_rfc3339(),
                "source_units": units.len(),
            }
        })))
    }
}

// ── Code Generation ──────────────────────────────────────────────────

fn compile(ids: &[String], network: &Record) -> Value {
    json!({
        "procedural": procedural_code(ids),
        "functional": functional_code(ids),
        "object_oriented": object_oriented_code(ids),
        "declarative": declarative_code(network),
        "api_definitions": api_definition(),
        "data_schemas": data_schemas(),
        "compilation_metadata": {
            "compiler_version": "1.0",
            "optimization_level": "O2",
            "target_architectures": ["x86_64", "arm64"],
        }
    })
}

fn id_array(ids: &[String]) -> String {
    serde_json::to_string(ids).unwrap_or_else(|_| "[]".into())
}

fn procedural_code(ids: &[String]) -> String {
    let mut lines = vec![
        "def process_linguistic_units():".to_string(),
        "    results = []".to_string(),
    ];
    for id in ids {
        lines.push(format!("    result = process_unit('{}')", id));
        lines.push("    results.append(result)".to_string());
    }
    lines.push("    return results".to_string());
    lines.join("\n")
}

fn functional_code(ids: &[String]) -> String {
    format!(
        "const processUnits = (units) => {{\n\
         \x20   return units\n\
         \x20       .map(unit => processUnit(unit))\n\
         \x20       .filter(result => result !== null);\n\
         }};\n\
         \n\
         const units = {};\n\
         const results = processUnits(units);\n",
        id_array(ids)
    )
}

fn object_oriented_code(ids: &[String]) -> String {
    format!(
        "class LinguisticProcessor {{\n\
         \x20   constructor() {{\n\
         \x20       this.units = {};\n\
         \x20   }}\n\
         \n\
         \x20   processAll() {{\n\
         \x20       return this.units.map(unit => this.processUnit(unit));\n\
         \x20   }}\n\
         \n\
         \x20   processUnit(unitId) {{\n\
         \x20       return {{ id: unitId, processed: true }};\n\
         \x20   }}\n\
         }}\n",
        id_array(ids)
    )
}

fn declarative_code(network: &Record) -> String {
    let facts: Vec<String> = network
        .list("nodes")
        .iter()
        .map(|node| {
            let concept = node.get("concept").and_then(Value::as_str).unwrap_or("");
            format!("node('{}', '{}').", id_label(&node["id"]), concept)
        })
        .collect();

    format!(
        "semantic_node(ID, Concept, Features) :-\n\
         \x20   node(ID, Concept),\n\
         \x20   features(ID, Features).\n\
         \n\
         {}\n\
         \n\
         process_network :-\n\
         \x20   findall(Node, semantic_node(Node, _, _), Nodes),\n\
         \x20   process_nodes(Nodes).\n",
        facts.join("\n")
    )
}

fn api_definition() -> Value {
    let array_of = |item: &str| json!({"type": "array", "items": {"type": item}});
    json!({
        "openapi": "3.0.0",
        "info": {"title": "JALS Linguistic Processing API", "version": "1.0.0"},
        "paths": {
            "/process": {
                "post": {
                    "summary": "Process linguistic units",
                    "requestBody": {"content": {"application/json": {"schema": {
                        "type": "object",
                        "properties": {"units": array_of("string")}
                    }}}},
                    "responses": {"200": {
                        "description": "Processing results",
                        "content": {"application/json": {"schema": {
                            "type": "object",
                            "properties": {"results": array_of("object")}
                        }}}
                    }}
                }
            }
        }
    })
}

fn data_schemas() -> Value {
    json!({
        "json_schema": {
            "type": "object",
            "properties": {
                "nodes": {"type": "array", "items": {"type": "object", "properties": {
                    "id": {"type": "string"},
                    "concept": {"type": "string"},
                    "features": {"type": "object"}
                }}},
                "edges": {"type": "array", "items": {"type": "object", "properties": {
                    "source": {"type": "string"},
                    "target": {"type": "string"},
                    "relation": {"type": "string"}
                }}}
            }
        },
        "graphql_schema": "type Node {\n  id: String!\n  concept: String!\n  features: JSON\n}\n\n\
                           type Edge {\n  source: String!\n  target: String!\n  relation: String!\n}\n\n\
                           type SemanticNetwork {\n  nodes: [Node!]!\n  edges: [Edge!]!\n}\n",
    })
}

fn monitoring_plan(systems: &Record) -> Value {
    let dashboards: Vec<String> = ["system_overview", "performance_metrics", "error_tracking"]
        .iter()
        .map(|d| d.to_string())
        .chain(systems.keys().map(|target| format!("{}_status", target)))
        .collect();

    json!({
        "metrics": [
            "response_time", "throughput", "error_rate", "cpu_usage",
            "memory_usage", "network_latency", "user_satisfaction"
        ],
        "alerts": [
            {"name": "high_error_rate", "condition": "error_rate > 5%", "action": "send_notification"},
            {"name": "high_latency", "condition": "response_time > 1000ms", "action": "auto_scale"}
        ],
        "dashboards": dashboards,
        "logging": {
            "level": "INFO",
            "format": "json",
            "destinations": ["file", "elasticsearch"],
            "retention": "30_days",
        },
        "tracing": {"system": "jaeger", "sampling_rate": 0.1, "trace_retention": "7_days"},
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer3_output() -> Record {
        into_record(json!({
            "linguistic_units": [{"id": "a"}, {"id": 2}],
            "semantic_network": {"nodes": [
                {"id": "a", "concept": "concept_a"},
                {"id": 2, "concept": "concept_2"}
            ]}
        }))
    }

    #[test]
    fn target_parsing_and_display() {
        assert_eq!("iot".parse::<DeploymentTarget>().unwrap(), DeploymentTarget::Iot);
        assert_eq!(DeploymentTarget::Edge.to_string(), "edge");
        assert!(matches!(
            "mars".parse::<DeploymentTarget>(),
            Err(LayerError::UnknownTarget(_))
        ));
    }

    #[test]
    fn per_target_optimizations() {
        assert_eq!(
            DeploymentTarget::Web.optimizations(),
            &["code_splitting", "lazy_loading", "caching"]
        );
        assert_eq!(DeploymentTarget::Iot.optimizations().len(), 2);
        assert_eq!(DeploymentTarget::Cloud.descriptor()["provider"], json!("AWS"));
    }

    #[test]
    fn deploy_generates_code_for_every_unit() {
        let out = ComputationalDeployer::default().deploy(&layer3_output()).unwrap();
        let code = &out["executable_code"];

        let procedural = code["procedural"].as_str().unwrap();
        assert!(procedural.contains("process_unit('a')"));
        assert!(procedural.contains("process_unit('2')"));
        assert!(code["functional"].as_str().unwrap().contains(r#"["a","2"]"#));
        assert!(code["object_oriented"].as_str().unwrap().contains("class LinguisticProcessor"));
        assert!(code["declarative"].as_str().unwrap().contains("node('2', 'concept_2')."));
        assert_eq!(code["api_definitions"]["openapi"], json!("3.0.0"));
        assert!(code["data_schemas"]["graphql_schema"].as_str().unwrap().contains("type Edge"));
    }

    #[test]
    fn deploy_covers_configured_targets() {
        let out = ComputationalDeployer::default().deploy(&layer3_output()).unwrap();
        let results = out["deployment_results"].as_object().unwrap();
        assert_eq!(results.len(), 5);
        assert_eq!(
            out["optimized_systems"]["mobile"]["optimizations"],
            json!(["battery_optimization", "memory_management"])
        );

        let deployer = ComputationalDeployer::new(StageConfig {
            deployment_targets: vec![DeploymentTarget::Edge],
            ..StageConfig::default()
        });
        let out = deployer.deploy(&layer3_output()).unwrap();
        assert_eq!(out["deployment_results"].as_object().unwrap().len(), 1);
        assert!(out["monitoring_data"]["dashboards"]
            .as_array()
            .unwrap()
            .contains(&json!("edge_status")));
    }

    #[test]
    fn deploy_metadata() {
        let out = ComputationalDeployer::default().deploy(&layer3_output()).unwrap();
        assert_eq!(out["deployment_metadata"]["source_units"], json!(2));
        assert_eq!(out["monitoring_data"]["alerts"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn unit_without_id_fails() {
        let input = into_record(json!({"linguistic_units": [{"category": "noun"}]}));
        let err = ComputationalDeployer::default().deploy(&input).unwrap_err();
        assert!(matches!(err, LayerError::MissingField(_)));
    }
}
