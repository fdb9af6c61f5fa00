#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod extension;
pub mod metrics;
pub mod pipeline;
pub mod scope;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{ConfigError, ExtensionError, ScanError, ScopeError, StrataError, TreeError};

// 설정
pub use config::ScanConfig;

// scope
pub use scope::{ComponentKey, Scope};

// 확장
pub use extension::{
    BatchExtensionMatcher, Capability, Extension, ExtensionDescriptor, ExtensionInstaller,
    ExtensionMatcher, InstalledExtension, InstantiationStrategy, StaticExtensionInstaller,
};

// 협력자 trait
pub use pipeline::{
    BuildToolExecutor, Component, ModuleExecutor, NoopBuildToolExecutor, ProjectBootstrapper,
};

// 도메인 타입
pub use types::{Module, ProjectTree};
