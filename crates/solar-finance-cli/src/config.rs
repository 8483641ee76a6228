use clap::{Args, ValueEnum};

use solar_finance_core::config::EngineConfig;
use solar_finance_core::TariffRulePolicy;

use crate::input;

/// How TARIFF incentive rules and the feed-in contract combine.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TariffPolicyArg {
    /// Count both (may double-count one program)
    SumBoth,
    /// Count only the feed-in contract valuation
    ContractOnly,
    /// Count only generic TARIFF rules
    RuleOnly,
}

impl From<TariffPolicyArg> for TariffRulePolicy {
    fn from(arg: TariffPolicyArg) -> Self {
        match arg {
            TariffPolicyArg::SumBoth => TariffRulePolicy::SumBoth,
            TariffPolicyArg::ContractOnly => TariffRulePolicy::ContractOnly,
            TariffPolicyArg::RuleOnly => TariffRulePolicy::RuleOnly,
        }
    }
}

/// Engine configuration source shared by the subcommands that need
/// reference tables.
#[derive(Args)]
pub struct ConfigArgs {
    /// Engine config file (YAML or JSON): regional multipliers, tariff rates,
    /// production assumptions, tariff rule policy
    #[arg(long)]
    pub config: Option<String>,
}

impl ConfigArgs {
    /// Resolve the engine config. Without a config file the reference tables
    /// are used, and a required policy must then come from the caller.
    pub fn load(
        &self,
        override_policy: Option<TariffRulePolicy>,
        policy_required: bool,
    ) -> Result<EngineConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => {
                let config: EngineConfig = input::file::read_yaml_or_json(path)?;
                log::info!("loaded engine config from {path}");
                config
            }
            None => {
                let policy = match override_policy {
                    Some(p) => p,
                    None if policy_required => {
                        return Err(
                            "--tariff-policy <sum-both|contract-only|rule-only> or --config required"
                                .into(),
                        )
                    }
                    // Tables only; the policy is never read by this command
                    None => TariffRulePolicy::ContractOnly,
                };
                log::info!("using reference engine tables");
                EngineConfig::reference(policy)
            }
        };

        if let Some(policy) = override_policy {
            config.tariff_rule_policy = policy;
        }
        config.validate()?;
        log::debug!(
            "{} regional multipliers, tariff policy {:?}",
            config.regional_multipliers.0.len(),
            config.tariff_rule_policy
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_required_without_config_file() {
        let args = ConfigArgs { config: None };
        assert!(args.load(None, true).is_err());
        let config = args
            .load(Some(TariffPolicyArg::RuleOnly.into()), true)
            .unwrap();
        assert_eq!(config.tariff_rule_policy, TariffRulePolicy::RuleOnly);
    }

    #[test]
    fn test_tables_only_needs_no_policy() {
        let args = ConfigArgs { config: None };
        let config = args.load(None, false).unwrap();
        assert_eq!(config.regional_multipliers.multiplier_for("karadeniz").to_string(), "1.15");
    }

    #[test]
    fn test_missing_config_file_reported() {
        let args = ConfigArgs {
            config: Some("/nonexistent/engine.yaml".into()),
        };
        let err = args.load(None, false).unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
