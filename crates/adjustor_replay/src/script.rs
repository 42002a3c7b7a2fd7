use adjustor_kernel_contracts::adjustor::{
    AdjustorOperation, AdjustorResponse, Address, HashMapInfo,
};
use adjustor_os::config::{ConfigError, RegistryConfig};
use adjustor_os::engine::AdjustorRuntime;
use adjustor_os::registry::AdjustorRegistry;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Operation script: an optional embedded authority and the operations to apply in order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub authority: Option<Address>,
    pub operations: Vec<AdjustorOperation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReplayLine {
    Ok {
        step: usize,
        response: AdjustorResponse,
    },
    Err {
        step: usize,
        error: String,
    },
    Summary {
        hash_map: HashMapInfo,
        audit_events: usize,
    },
}

/// Authority precedence: command line, then script, then environment.
pub fn resolve_config<F>(
    cli_authority: Option<&str>,
    script: &ReplayScript,
    env_lookup: F,
) -> Result<RegistryConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = cli_authority {
        let authority = Address::from_hex(raw.trim()).map_err(|violation| {
            ConfigError::Invalid {
                var: "--authority",
                violation,
            }
        })?;
        return RegistryConfig::v1(authority);
    }
    if let Some(authority) = script.authority {
        return RegistryConfig::v1(authority);
    }
    RegistryConfig::from_env_var_map(env_lookup)
}

/// Applies every operation in order. Failures are reported per step and do not stop the run.
pub fn replay(
    registry: &mut AdjustorRegistry,
    operations: &[AdjustorOperation],
) -> Vec<ReplayLine> {
    let mut lines = Vec::with_capacity(operations.len() + 1);
    for (step, op) in operations.iter().enumerate() {
        let mutation = op.request.is_mutation();
        match registry.apply(op) {
            Ok(response) => {
                debug!(step, mutation, "operation applied");
                lines.push(ReplayLine::Ok { step, response });
            }
            Err(e) => {
                if mutation {
                    warn!(step, caller = %op.caller, error = %e, "mutation rejected");
                } else {
                    warn!(step, error = %e, "read failed");
                }
                lines.push(ReplayLine::Err {
                    step,
                    error: e.to_string(),
                });
            }
        }
    }
    lines.push(ReplayLine::Summary {
        hash_map: AdjustorRuntime::hash_map(registry.store()),
        audit_events: registry.audit_log().events().len(),
    });
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script_json() -> String {
        let trust = format!("0x{}", "71".repeat(20));
        let stranger = format!("0x{}", "99".repeat(20));
        let owner = format!("0x{}", "0a".repeat(20));
        let agreement = format!("0x{}", "01".repeat(32));
        format!(
            r#"{{
                "authority": "{trust}",
                "operations": [
                    {{"caller": "{trust}", "now": 1, "request": {{
                        "op": "create",
                        "owner": "{owner}",
                        "settlement_approval_amount_cu": 1000,
                        "policy_risk_point_limit": 5,
                        "service_agreement_hash": "{agreement}"
                    }}}},
                    {{"caller": "{stranger}", "now": 2, "request": {{
                        "op": "create",
                        "owner": "{owner}",
                        "settlement_approval_amount_cu": 1,
                        "policy_risk_point_limit": 1,
                        "service_agreement_hash": "{agreement}"
                    }}}},
                    {{"caller": "{stranger}", "now": 3, "request": {{"op": "hash_map"}}}}
                ]
            }}"#
        )
    }

    #[test]
    fn at_replay_01_script_applies_in_order_and_reports_failures() {
        let script: ReplayScript = serde_json::from_str(&script_json()).unwrap();
        let cfg = resolve_config(None, &script, |_| None).unwrap();
        let mut registry = AdjustorRegistry::new(&cfg);

        let lines = replay(&mut registry, &script.operations);

        assert_eq!(lines.len(), 4);
        assert!(matches!(
            &lines[0],
            ReplayLine::Ok {
                step: 0,
                response: AdjustorResponse::Transition(_)
            }
        ));
        assert!(matches!(&lines[1], ReplayLine::Err { step: 1, .. }));
        let expected = HashMapInfo {
            first_idx: 0,
            next_idx: 1,
            count: 1,
        };
        assert_eq!(
            lines[2],
            ReplayLine::Ok {
                step: 2,
                response: AdjustorResponse::HashMap(expected)
            }
        );
        assert_eq!(
            lines[3],
            ReplayLine::Summary {
                hash_map: expected,
                audit_events: 3
            }
        );
    }

    #[test]
    fn at_replay_02_authority_precedence() {
        let script = ReplayScript {
            authority: Some(Address::new([2; 20])),
            operations: Vec::new(),
        };
        let env = |_: &str| Some("33".repeat(20));

        let cli = "44".repeat(20);
        let cfg = resolve_config(Some(cli.as_str()), &script, env).unwrap();
        assert_eq!(cfg.authority, Address::new([0x44; 20]));

        let cfg = resolve_config(None, &script, env).unwrap();
        assert_eq!(cfg.authority, Address::new([2; 20]));

        let bare = ReplayScript {
            authority: None,
            operations: Vec::new(),
        };
        let cfg = resolve_config(None, &bare, env).unwrap();
        assert_eq!(cfg.authority, Address::new([0x33; 20]));

        assert!(resolve_config(Some("0xnope"), &bare, env).is_err());
    }

    #[test]
    fn at_replay_03_lines_serialize_with_outcome_tag() {
        let line = ReplayLine::Err {
            step: 4,
            error: "registry lock poisoned".to_string(),
        };
        let json = serde_json::to_string(&line).unwrap();
        assert_eq!(
            json,
            r#"{"outcome":"err","step":4,"error":"registry lock poisoned"}"#
        );
    }
}
