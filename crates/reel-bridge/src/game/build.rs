use serde::{Deserialize, Serialize};

/// Where a Unity WebGL build lives and how it identifies itself.
///
/// The blob URLs are derived from `build_url`, `stem` and `compression`,
/// e.g. `/unity/Build/unity_game.wasm.br`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UnityBuild {
    pub build_url: String,
    pub stem: String,
    /// Suffix of the pre-compressed blobs, e.g. `.br`. Empty for none.
    pub compression: String,
    pub streaming_assets_url: String,
    pub company_name: String,
    pub product_name: String,
    pub product_version: String,
}

impl Default for UnityBuild {
    fn default() -> Self {
        Self {
            build_url: "/unity/Build".to_string(),
            stem: "unity_game".to_string(),
            compression: ".br".to_string(),
            streaming_assets_url: "StreamingAssets".to_string(),
            company_name: "DefaultCompany".to_string(),
            product_name: "Racing_Prototype".to_string(),
            product_version: "1.0".to_string(),
        }
    }
}

/// The config object passed to `createUnityInstance`, minus `showBanner`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnityInstanceConfig {
    pub arguments: Vec<String>,
    pub data_url: String,
    pub framework_url: String,
    pub code_url: String,
    pub streaming_assets_url: String,
    pub company_name: String,
    pub product_name: String,
    pub product_version: String,
}

impl UnityBuild {
    fn blob(&self, ext: &str) -> String {
        format!(
            "{}/{}.{}{}",
            self.build_url.trim_end_matches('/'),
            self.stem,
            ext,
            self.compression
        )
    }

    /// The loader script is never compressed.
    pub fn loader_url(&self) -> String {
        format!("{}/{}.loader.js", self.build_url.trim_end_matches('/'), self.stem)
    }

    pub fn data_url(&self) -> String {
        self.blob("data")
    }

    pub fn framework_url(&self) -> String {
        self.blob("framework.js")
    }

    pub fn code_url(&self) -> String {
        self.blob("wasm")
    }

    pub fn instance_config(&self) -> UnityInstanceConfig {
        UnityInstanceConfig {
            arguments: Vec::new(),
            data_url: self.data_url(),
            framework_url: self.framework_url(),
            code_url: self.code_url(),
            streaming_assets_url: self.streaming_assets_url.clone(),
            company_name: self.company_name.clone(),
            product_name: self.product_name.clone(),
            product_version: self.product_version.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_build_urls() {
        let build = UnityBuild::default();
        assert_eq!(build.loader_url(), "/unity/Build/unity_game.loader.js");
        assert_eq!(build.data_url(), "/unity/Build/unity_game.data.br");
        assert_eq!(build.framework_url(), "/unity/Build/unity_game.framework.js.br");
        assert_eq!(build.code_url(), "/unity/Build/unity_game.wasm.br");
    }

    #[test]
    fn uncompressed_build_with_trailing_slash() {
        let build = UnityBuild {
            build_url: "https://cdn.example/game/".to_string(),
            compression: String::new(),
            ..UnityBuild::default()
        };
        assert_eq!(build.code_url(), "https://cdn.example/game/unity_game.wasm");
        assert_eq!(build.loader_url(), "https://cdn.example/game/unity_game.loader.js");
    }

    #[test]
    fn instance_config_wire_names() {
        let json = serde_json::to_value(UnityBuild::default().instance_config()).unwrap();
        assert_eq!(json["dataUrl"], "/unity/Build/unity_game.data.br");
        assert_eq!(json["streamingAssetsUrl"], "StreamingAssets");
        assert_eq!(json["productName"], "Racing_Prototype");
        assert!(json["arguments"].as_array().unwrap().is_empty());
    }
}
