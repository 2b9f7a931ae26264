//! IP geolocation via ip-api.com.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::kernel::traits::BaseGeoLocator;

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    #[serde(default)]
    city: String,
    #[serde(default, rename = "regionName")]
    region_name: String,
    #[serde(default)]
    country: String,
}

/// Free-tier ip-api.com lookup. Best-effort by contract: callers treat
/// a failure as "no address", never as a request failure.
pub struct IpApiLocator {
    client: Client,
}

impl IpApiLocator {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for IpApiLocator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseGeoLocator for IpApiLocator {
    async fn locate(&self, ip_address: &str) -> anyhow::Result<String> {
        let url = format!("http://ip-api.com/json/{}", ip_address);
        let response: IpApiResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let address = [response.city, response.region_name, response.country]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Ok(address)
    }
}
