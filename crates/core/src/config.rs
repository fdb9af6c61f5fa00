//! 설정 관리 — strata.toml 파싱 및 세션 설정
//!
//! [`ScanConfig`]는 스캔 세션 하나가 읽는 모든 설정을 담는 최상위 구조체입니다.
//! 세션 조립 시점에 한 번 읽히고, 이후에는 불변 값으로 필요한 컴포넌트에
//! 명시적으로 전달됩니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`STRATA_DIAGNOSTICS_PROFILING=true` 형식)
//! 3. 설정 파일 (`strata.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 프로젝트 속성
//! `[properties]` 섹션의 중첩 테이블은 점으로 연결된 평면 키로 펼쳐집니다.
//! ```toml
//! [properties]
//! project.key = "shop"
//! project.modules = "core,web"
//! core.name = "Core"
//! ```
//! 위 설정은 `project.key`, `project.modules`, `core.name` 세 키가 됩니다.
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), strata_core::error::StrataError> {
//! use strata_core::config::ScanConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = ScanConfig::load("strata.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = ScanConfig::parse("[diagnostics]\nprofiling = true")?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::error::{ConfigError, StrataError};

/// Strata 스캔 설정
///
/// `strata.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 진단 설정
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    /// 기본 부트스트래퍼에 그대로 전달되는 프로젝트 속성
    #[serde(default, deserialize_with = "deserialize_properties")]
    pub properties: BTreeMap<String, String>,
}

impl ScanConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StrataError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, StrataError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StrataError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                StrataError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, StrataError> {
        toml::from_str(toml_str).map_err(|e| {
            StrataError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `STRATA_{SECTION}_{FIELD}`
    /// 예: `STRATA_DIAGNOSTICS_PROFILING=true`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "STRATA_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "STRATA_GENERAL_LOG_FORMAT");

        // Diagnostics
        override_bool(
            &mut self.diagnostics.profiling,
            "STRATA_DIAGNOSTICS_PROFILING",
        );
        override_usize(
            &mut self.diagnostics.slowest_modules,
            "STRATA_DIAGNOSTICS_SLOWEST_MODULES",
        );
    }

    /// 프로젝트 속성을 설정합니다. 같은 키가 있으면 덮어씁니다.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// 프로젝트 속성 값을 조회합니다.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), StrataError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // 속성 키 검증
        if let Some(key) = self.properties.keys().find(|k| k.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: format!("properties.{key}"),
                reason: "property keys must not be empty".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 진단 설정
///
/// 값이 없으면 모두 비활성화 상태로 취급합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// 단계별 소요 시간 프로파일러 등록 여부
    pub profiling: bool,
    /// 요약에 표시할 느린 모듈 수
    pub slowest_modules: usize,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            profiling: false,
            slowest_modules: 5,
        }
    }
}

// ─── 속성 펼치기 ─────────────────────────────────────────────────────

fn deserialize_properties<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let table = toml::Table::deserialize(deserializer)?;
    let mut flat = BTreeMap::new();
    flatten_table("", &table, &mut flat);
    Ok(flat)
}

fn flatten_table(prefix: &str, table: &toml::Table, out: &mut BTreeMap<String, String>) {
    for (key, value) in table {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::Table(nested) => flatten_table(&full_key, nested, out),
            other => {
                out.insert(full_key, scalar_to_string(other));
            }
        }
    }
}

/// 배열은 쉼표로 연결합니다 (`modules = ["a", "b"]` → `"a,b"`).
fn scalar_to_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Array(items) => items
            .iter()
            .map(scalar_to_string)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

// ─── 환경변수 오버라이드 ─────────────────────────────────────────────

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}
