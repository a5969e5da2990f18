use std::fmt;

use serde::{Deserialize, Serialize};

use finsight_market_data::AssetClass;

/// Investment type as the persistence layer records it.
///
/// Unrecognized types are kept verbatim in [`InvestmentType::Other`] so a
/// record survives a sync round trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InvestmentType {
    Stock,
    Etf,
    MutualFund,
    Crypto,
    FixedDeposit,
    Bonds,
    RealEstate,
    Gold,
    Other(String),
}

impl InvestmentType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Stock => "stock",
            Self::Etf => "etf",
            Self::MutualFund => "mutual-fund",
            Self::Crypto => "crypto",
            Self::FixedDeposit => "fixed-deposit",
            Self::Bonds => "bonds",
            Self::RealEstate => "real-estate",
            Self::Gold => "gold",
            Self::Other(raw) => raw,
        }
    }

    /// Provider family that can price this type, `None` for types without a
    /// market price feed.
    pub fn asset_class(&self) -> Option<AssetClass> {
        match self {
            Self::Stock | Self::Etf => Some(AssetClass::Equity),
            Self::MutualFund => Some(AssetClass::MutualFund),
            Self::Crypto => Some(AssetClass::Crypto),
            _ => None,
        }
    }
}

impl From<String> for InvestmentType {
    fn from(raw: String) -> Self {
        let normalized = raw.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "stock" | "stocks" | "equity" | "share" => Self::Stock,
            "etf" => Self::Etf,
            "mutual-fund" | "mutualfund" | "mf" => Self::MutualFund,
            "crypto" | "cryptocurrency" => Self::Crypto,
            "fixed-deposit" | "fd" => Self::FixedDeposit,
            "bonds" | "bond" => Self::Bonds,
            "real-estate" | "property" => Self::RealEstate,
            "gold" => Self::Gold,
            _ => Self::Other(raw),
        }
    }
}

impl From<InvestmentType> for String {
    fn from(value: InvestmentType) -> Self {
        match value {
            InvestmentType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for InvestmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!(InvestmentType::from("Mutual_Fund".to_string()), InvestmentType::MutualFund);
        assert_eq!(InvestmentType::from("stock".to_string()), InvestmentType::Stock);
        assert_eq!(InvestmentType::from("FD".to_string()), InvestmentType::FixedDeposit);
    }

    #[test]
    fn test_unknown_type_is_preserved() {
        let ty: InvestmentType = serde_json::from_str("\"ULIP\"").unwrap();
        assert_eq!(ty, InvestmentType::Other("ULIP".to_string()));
        assert_eq!(serde_json::to_string(&ty).unwrap(), "\"ULIP\"");
        assert_eq!(ty.asset_class(), None);
    }

    #[test]
    fn test_market_priced_types() {
        assert_eq!(InvestmentType::Etf.asset_class(), Some(AssetClass::Equity));
        assert_eq!(InvestmentType::MutualFund.asset_class(), Some(AssetClass::MutualFund));
        assert_eq!(InvestmentType::Crypto.asset_class(), Some(AssetClass::Crypto));
        assert_eq!(InvestmentType::FixedDeposit.asset_class(), None);
        assert_eq!(InvestmentType::Bonds.asset_class(), None);
    }
}
