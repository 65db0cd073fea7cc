use {
    crate::domain,
    alloy_primitives::Address,
    bigdecimal::BigDecimal,
    serde::Deserialize,
    serde_with::{DisplayFromStr, serde_as},
    std::{collections::HashSet, path::Path},
    tokio::fs,
};

/// Every field is optional. Missing ones fall back to the Polygon deployment.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct File {
    /// The reference currency token.
    reference_token: Option<Address>,

    /// Pool pricing the reference currency in USD. Its token0 must be a USD
    /// stablecoin and its token1 the reference token.
    anchor_pool: Option<Address>,

    /// Tokens valued at exactly one USD.
    stablecoins: Option<HashSet<Address>>,

    /// Minimum reference value a pool has to lock to be used for pricing, as
    /// a decimal string.
    #[serde_as(as = "Option<DisplayFromStr>")]
    min_liquidity_threshold: Option<BigDecimal>,

    /// Address of the factory entity counting all transactions.
    factory: Option<Address>,
}

impl File {
    fn into_domain(self) -> domain::Config {
        let default = domain::Config::polygon();
        domain::Config {
            reference_token: self.reference_token.unwrap_or(default.reference_token),
            anchor_pool: self.anchor_pool.unwrap_or(default.anchor_pool),
            stablecoins: self.stablecoins.unwrap_or(default.stablecoins),
            min_liquidity_threshold: self
                .min_liquidity_threshold
                .unwrap_or(default.min_liquidity_threshold),
            factory: self.factory.unwrap_or(default.factory),
        }
    }
}

/// Parses the TOML configuration.
pub fn from_toml(data: &str) -> Result<domain::Config, toml::de::Error> {
    toml::de::from_str::<File>(data).map(File::into_domain)
}

/// Load the indexer configuration from a TOML file.
///
/// # Panics
///
/// This method panics if the config is invalid or on I/O errors.
pub async fn load(path: &Path) -> domain::Config {
    let data = fs::read_to_string(path)
        .await
        .unwrap_or_else(|e| panic!("I/O error while reading {path:?}: {e:?}"));
    from_toml(&data).unwrap_or_else(|e| panic!("TOML error while reading {path:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::domain::config::polygon,
        alloy_primitives::address,
        maplit::hashset,
        std::str::FromStr,
    };

    #[test]
    fn empty_file_is_polygon() {
        assert_eq!(from_toml("").unwrap(), domain::Config::polygon());
    }

    #[test]
    fn overrides() {
        let config = from_toml(
            r#"
            reference-token = "0x0000000000000000000000000000000000000001"
            stablecoins = ["0x0000000000000000000000000000000000000002"]
            min-liquidity-threshold = "0.5"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.reference_token,
            address!("0x0000000000000000000000000000000000000001")
        );
        assert_eq!(
            config.stablecoins,
            hashset![address!("0x0000000000000000000000000000000000000002")]
        );
        assert_eq!(
            config.min_liquidity_threshold,
            BigDecimal::from_str("0.5").unwrap()
        );
        assert_eq!(config.anchor_pool, polygon::USDC_WETH_03_POOL);
        assert_eq!(config.factory, polygon::FACTORY);
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(from_toml("min-liquidity = \"1\"").is_err());
    }
}
