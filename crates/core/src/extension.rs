//! 확장 시스템 — 능력 태그, 인스턴스화 전략, 선택기, 설치기
//!
//! 확장은 등록 시점에 [`ExtensionDescriptor`]로 능력 태그([`Capability`])와
//! 인스턴스화 전략([`InstantiationStrategy`])을 선언합니다.
//! 선택은 descriptor만 보는 순수 함수([`select`])로 수행되며,
//! 결과 순서는 설치기가 발견한 순서를 그대로 따릅니다.
//!
//! # 세션 조립 흐름
//! ```text
//! ExtensionInstaller::discover(&BatchExtensionMatcher)
//!     └─ select(candidates, matcher)      ← 순수 필터, 순서 보존
//!          └─ install(scope, extensions)  ← 이름으로 세션 scope에 바인딩
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ExtensionError, ScopeError};
use crate::pipeline::Component;
use crate::scope::Scope;

// ─── Capability ──────────────────────────────────────────────────────

/// 확장 능력 태그
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// 배치(스캔 세션) 측에서 동작하는 확장
    Batch,
    /// 서버 측에서만 동작하는 확장
    Server,
    /// 사용자 정의 태그
    Custom(String),
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Batch => write!(f, "batch"),
            Self::Server => write!(f, "server"),
            Self::Custom(name) => write!(f, "custom:{name}"),
        }
    }
}

// ─── InstantiationStrategy ───────────────────────────────────────────

/// 확장 인스턴스화 전략
///
/// 세션/모듈 트리에 대해 확장을 얼마나 자주, 어디에 생성할지 선언합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstantiationStrategy {
    /// 세션당 한 번 (세션 scope)
    PerBatch,
    /// 모듈마다 한 번 (모듈 scope)
    PerModule,
    /// 분석 단위마다 한 번
    PerAnalysis,
}

impl fmt::Display for InstantiationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PerBatch => write!(f, "PER_BATCH"),
            Self::PerModule => write!(f, "PER_MODULE"),
            Self::PerAnalysis => write!(f, "PER_ANALYSIS"),
        }
    }
}

// ─── ExtensionDescriptor ─────────────────────────────────────────────

/// 확장 메타데이터
///
/// 등록 이후 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionDescriptor {
    /// 확장 고유 이름 (예: `"duplication-sensor"`)
    pub name: String,
    /// 능력 태그
    pub capabilities: BTreeSet<Capability>,
    /// 인스턴스화 전략
    pub strategy: InstantiationStrategy,
}

impl ExtensionDescriptor {
    /// 태그 없는 descriptor를 생성합니다.
    pub fn new(name: impl Into<String>, strategy: InstantiationStrategy) -> Self {
        Self {
            name: name.into(),
            capabilities: BTreeSet::new(),
            strategy,
        }
    }

    /// 능력 태그를 추가합니다.
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    /// 주어진 태그를 가지고 있는지 여부
    pub fn has_capability(&self, capability: &Capability) -> bool {
        self.capabilities.contains(capability)
    }
}

// ─── Extension Trait ─────────────────────────────────────────────────

/// 외부에서 공급되는 확장
///
/// 세션 scope에 설치되면 scope 해제 시 [`Extension::release`]가 호출됩니다.
pub trait Extension: Send + Sync {
    /// 확장 메타데이터를 반환합니다.
    fn descriptor(&self) -> &ExtensionDescriptor;

    /// 설치된 scope가 해제될 때 호출됩니다.
    fn release(&self) {}
}

/// scope에 바인딩되는 설치된 확장
///
/// scope 해제 시 감싼 확장의 [`Extension::release`]를 호출합니다.
#[derive(Clone)]
pub struct InstalledExtension(pub Arc<dyn Extension>);

impl InstalledExtension {
    /// 확장 메타데이터
    pub fn descriptor(&self) -> &ExtensionDescriptor {
        self.0.descriptor()
    }
}

impl Component for InstalledExtension {
    fn release(&self) {
        self.0.release();
    }
}

impl fmt::Debug for InstalledExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InstalledExtension")
            .field(&self.descriptor().name)
            .finish()
    }
}

// ─── Matcher / Selector ──────────────────────────────────────────────

/// 확장 적격성 판정 trait
///
/// 구현은 descriptor만 보고 판정해야 하며 부수 효과가 없어야 합니다.
pub trait ExtensionMatcher {
    /// 확장이 이번 단계에 적격인지 판정합니다.
    fn accept(&self, descriptor: &ExtensionDescriptor) -> bool;
}

impl<F> ExtensionMatcher for F
where
    F: Fn(&ExtensionDescriptor) -> bool,
{
    fn accept(&self, descriptor: &ExtensionDescriptor) -> bool {
        self(descriptor)
    }
}

/// 세션 조립 단계에서 사용하는 판정기
///
/// [`Capability::Batch`] 태그가 있고 전략이 정확히
/// [`InstantiationStrategy::PerBatch`]인 확장만 허용합니다.
/// 모듈 단위 확장은 모듈 실행기가 따로 설치합니다.
#[derive(Debug, Default, Clone, Copy)]
pub struct BatchExtensionMatcher;

impl ExtensionMatcher for BatchExtensionMatcher {
    fn accept(&self, descriptor: &ExtensionDescriptor) -> bool {
        descriptor.has_capability(&Capability::Batch)
            && descriptor.strategy == InstantiationStrategy::PerBatch
    }
}

/// 후보 중 적격 확장을 발견 순서대로 골라냅니다.
///
/// 후보를 변경하지 않으며 같은 입력에 대해 항상 같은 결과를 냅니다.
pub fn select(
    candidates: &[Arc<dyn Extension>],
    matcher: &dyn ExtensionMatcher,
) -> Vec<Arc<dyn Extension>> {
    candidates
        .iter()
        .filter(|ext| matcher.accept(ext.descriptor()))
        .cloned()
        .collect()
}

/// 확장을 세션 scope에 이름으로 바인딩합니다.
///
/// 설치된 확장 이름을 설치 순서대로 반환합니다.
/// 같은 이름이 이미 바인딩되어 있으면 [`ScopeError::AlreadyBound`]를 반환합니다.
pub fn install(
    scope: &mut Scope<'_>,
    extensions: Vec<Arc<dyn Extension>>,
) -> Result<Vec<String>, ScopeError> {
    let mut installed = Vec::with_capacity(extensions.len());
    for extension in extensions {
        let name = extension.descriptor().name.clone();
        debug!(
            extension = %name,
            strategy = %extension.descriptor().strategy,
            scope = scope.label(),
            "installing extension"
        );
        scope.bind_named_component(name.clone(), InstalledExtension(extension))?;
        installed.push(name);
    }
    Ok(installed)
}

// ─── Installer ───────────────────────────────────────────────────────

/// 외부 확장 발견 trait
pub trait ExtensionInstaller: Send + Sync {
    /// 판정기를 통과한 후보를 발견 순서대로 반환합니다.
    fn discover(&self, matcher: &dyn ExtensionMatcher) -> Vec<Arc<dyn Extension>>;
}

/// 등록 순서를 발견 순서로 사용하는 설치기
///
/// # 사용 예시
/// ```ignore
/// let mut installer = StaticExtensionInstaller::new();
/// installer.register(Arc::new(duplication_sensor))?;
/// installer.register(Arc::new(coverage_importer))?;
///
/// let eligible = installer.discover(&BatchExtensionMatcher);
/// ```
#[derive(Default, Clone)]
pub struct StaticExtensionInstaller {
    extensions: Vec<Arc<dyn Extension>>,
}

impl StaticExtensionInstaller {
    /// 빈 설치기를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 확장을 등록합니다.
    ///
    /// 동일한 이름의 확장이 이미 등록되어 있으면 에러를 반환합니다.
    pub fn register(&mut self, extension: Arc<dyn Extension>) -> Result<(), ExtensionError> {
        let name = &extension.descriptor().name;
        if self.extensions.iter().any(|e| &e.descriptor().name == name) {
            return Err(ExtensionError::AlreadyRegistered { name: name.clone() });
        }
        self.extensions.push(extension);
        Ok(())
    }

    /// 등록된 확장 수를 반환합니다.
    pub fn count(&self) -> usize {
        self.extensions.len()
    }

    /// 등록된 모든 확장의 메타데이터를 반환합니다.
    pub fn list(&self) -> Vec<&ExtensionDescriptor> {
        self.extensions.iter().map(|e| e.descriptor()).collect()
    }
}

impl ExtensionInstaller for StaticExtensionInstaller {
    fn discover(&self, matcher: &dyn ExtensionMatcher) -> Vec<Arc<dyn Extension>> {
        select(&self.extensions, matcher)
    }
}

impl fmt::Debug for StaticExtensionInstaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticExtensionInstaller")
            .field("extensions", &self.list())
            .finish()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
