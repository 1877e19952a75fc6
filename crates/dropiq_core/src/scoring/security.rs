//! Security heuristic: severity-weighted penalties summed into a 0-100 risk score.

use serde::{Deserialize, Serialize};

use super::url::UrlAssessment;
use crate::providers::ContractRisk;

/// Buy/sell tax above this fraction is penalised.
const HIGH_TAX: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Safe,
    Caution,
    Avoid,
}

/// Bucket a clamped risk score.
pub fn risk_level(score: u32) -> RiskLevel {
    match score {
        0..=29 => RiskLevel::Safe,
        30..=69 => RiskLevel::Caution,
        _ => RiskLevel::Avoid,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub code: String,
    pub severity: Severity,
    pub points: u32,
    pub message: String,
}

/// Everything the analyzer learned about a target.
#[derive(Debug, Clone, Default)]
pub struct SecuritySignals {
    /// Reason text when the domain is blacklisted
    pub domain_blacklisted: Option<String>,
    /// Reason text when the contract is blacklisted
    pub contract_blacklisted: Option<String>,
    pub contract_risk: Option<ContractRisk>,
    pub url: Option<UrlAssessment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityScore {
    /// 0-100, higher is riskier
    pub score: u32,
    pub level: RiskLevel,
    pub findings: Vec<Finding>,
}

fn finding(code: &str, severity: Severity, points: u32, message: impl Into<String>) -> Finding {
    Finding {
        code: code.to_string(),
        severity,
        points,
        message: message.into(),
    }
}

fn contract_findings(risk: &ContractRisk, out: &mut Vec<Finding>) {
    use Severity::*;

    if risk.is_honeypot {
        out.push(finding("honeypot", Critical, 70, "Token cannot be sold (honeypot)"));
    }
    if risk.selfdestruct {
        out.push(finding("selfdestruct", Critical, 40, "Contract can self-destruct"));
    }
    if risk.hidden_owner {
        out.push(finding("hidden_owner", High, 30, "Contract has a hidden owner"));
    }
    if risk.can_take_back_ownership {
        out.push(finding(
            "take_back_ownership",
            High,
            30,
            "Ownership can be reclaimed after renouncing",
        ));
    }
    if risk.is_mintable {
        out.push(finding("mintable", High, 25, "Owner can mint new tokens"));
    }
    if let Some(tax) = risk.max_tax().filter(|t| *t > HIGH_TAX) {
        out.push(finding(
            "high_tax",
            High,
            25,
            format!("Buy/sell tax of {:.0}%", tax * 100.0),
        ));
    }
    if risk.is_open_source == Some(false) {
        out.push(finding("closed_source", Medium, 20, "Contract source is not verified"));
    }
    if risk.is_proxy {
        out.push(finding("proxy", Medium, 15, "Contract logic is upgradeable"));
    }
}

fn url_findings(url: &UrlAssessment, out: &mut Vec<Finding>) {
    use Severity::*;

    if let Some((target, distance)) = &url.typosquat_of {
        out.push(finding(
            "typosquatting",
            Critical,
            40,
            format!("{} imitates {} (distance {})", url.host, target, distance),
        ));
    }
    if !url.uses_https {
        out.push(finding("no_https", High, 25, "Site does not use HTTPS"));
    }
    if let Some(tld) = &url.suspicious_tld {
        out.push(finding("suspicious_tld", Medium, 20, format!("Suspicious TLD .{tld}")));
    }
    if !url.suspicious_params.is_empty() {
        out.push(finding(
            "suspicious_params",
            Medium,
            15,
            format!("URL asks for {}", url.suspicious_params.join(", ")),
        ));
    }
}

/// Sum penalties from all signals, clamp and bucket.
pub fn score_security(signals: &SecuritySignals) -> SecurityScore {
    let mut findings = Vec::new();

    if let Some(reason) = &signals.domain_blacklisted {
        findings.push(finding(
            "blacklisted_domain",
            Severity::Critical,
            80,
            format!("Domain is blacklisted: {reason}"),
        ));
    }
    if let Some(reason) = &signals.contract_blacklisted {
        findings.push(finding(
            "blacklisted_contract",
            Severity::Critical,
            80,
            format!("Contract is blacklisted: {reason}"),
        ));
    }
    if let Some(risk) = &signals.contract_risk {
        contract_findings(risk, &mut findings);
    }
    if let Some(url) = &signals.url {
        url_findings(url, &mut findings);
    }

    findings.sort_by(|a, b| b.severity.cmp(&a.severity).then(b.points.cmp(&a.points)));
    let score = findings.iter().map(|f| f.points).sum::<u32>().min(100);

    SecurityScore {
        score,
        level: risk_level(score),
        findings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn clean_url(host: &str) -> UrlAssessment {
        UrlAssessment {
            host: host.to_string(),
            uses_https: true,
            suspicious_tld: None,
            typosquat_of: None,
            suspicious_params: Vec::new(),
        }
    }

    #[test]
    fn test_risk_buckets_cover_range() {
        for score in 0..=100 {
            let level = risk_level(score);
            let expected = if score < 30 {
                RiskLevel::Safe
            } else if score < 70 {
                RiskLevel::Caution
            } else {
                RiskLevel::Avoid
            };
            assert_eq!(level, expected, "score {score}");
        }
    }

    #[test]
    fn test_clean_target_is_safe() {
        let result = score_security(&SecuritySignals {
            url: Some(clean_url("uniswap.org")),
            contract_risk: Some(ContractRisk {
                is_open_source: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert_eq!(result.score, 0);
        assert_eq!(result.level, RiskLevel::Safe);
        assert!(result.findings.is_empty());
    }

    #[test]
    fn test_blacklisted_domain_is_avoid() {
        let result = score_security(&SecuritySignals {
            domain_blacklisted: Some("drainer".into()),
            url: Some(clean_url("evil.com")),
            ..Default::default()
        });
        assert_eq!(result.score, 80);
        assert_eq!(result.level, RiskLevel::Avoid);
    }

    #[test]
    fn test_url_penalties_add_up() {
        let result = score_security(&SecuritySignals {
            url: Some(UrlAssessment {
                host: "unlswap.xyz".into(),
                uses_https: false,
                suspicious_tld: Some("xyz".into()),
                typosquat_of: Some(("uniswap.org".into(), 2)),
                suspicious_params: vec!["seed".into()],
            }),
            ..Default::default()
        });
        // 40 + 25 + 20 + 15
        assert_eq!(result.score, 100);
        assert_eq!(result.findings[0].code, "typosquatting");
        assert_eq!(result.findings[0].severity, Severity::Critical);
    }

    #[test]
    fn test_contract_penalties() {
        let result = score_security(&SecuritySignals {
            contract_risk: Some(ContractRisk {
                is_mintable: true,
                is_proxy: true,
                buy_tax: Some(0.05),
                sell_tax: Some(0.10),
                ..Default::default()
            }),
            ..Default::default()
        });
        // 10 % tax is not above the limit
        assert_eq!(result.score, 40);
        assert_eq!(result.level, RiskLevel::Caution);
        let codes: Vec<&str> = result.findings.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, vec!["mintable", "proxy"]);
    }

    #[test]
    fn test_score_clamped() {
        let result = score_security(&SecuritySignals {
            domain_blacklisted: Some("x".into()),
            contract_blacklisted: Some("y".into()),
            contract_risk: Some(ContractRisk {
                is_honeypot: true,
                ..Default::default()
            }),
            ..Default::default()
        });
        assert_eq!(result.score, 100);
        assert_eq!(result.findings.len(), 3);
    }
}
