//! 협력자 trait — 오케스트레이터가 호출하는 외부 확장 지점
//!
//! 오케스트레이터는 분석 알고리즘을 직접 구현하지 않습니다.
//! 트리 구성, 빌드 도구 실행, 모듈별 분석은 아래 trait의 구현체에 위임합니다.

use std::any::Any;

use tracing::debug;

use crate::error::StrataError;
use crate::scope::Scope;
use crate::types::{Module, ProjectTree};

/// scope에 바인딩되어 scope 종료 시 해제 훅을 받는 컴포넌트
///
/// 해제는 바인딩 역순으로 호출됩니다.
pub trait Component: Any + Send + Sync {
    /// scope가 해제될 때 호출됩니다.
    fn release(&self) {}
}

/// 프로젝트 트리를 구성하는 trait
///
/// 세션 scope에 `Box<dyn ProjectBootstrapper>`로 바인딩하면
/// 기본 부트스트래퍼 대신 사용됩니다.
pub trait ProjectBootstrapper: Send + Sync {
    /// 진단 메시지에 사용되는 부트스트래퍼 이름
    fn name(&self) -> &str;

    /// 프로젝트 트리를 구성합니다.
    ///
    /// `Ok(None)`은 사용할 수 없는 트리로 취급되어 세션이 중단됩니다.
    fn bootstrap(&self) -> Result<Option<ProjectTree>, StrataError>;
}

/// 빌드 도구 실행 어댑터
///
/// 세션 scope에 `Box<dyn BuildToolExecutor>`로 바인딩됩니다.
pub trait BuildToolExecutor: Send + Sync {
    /// 어댑터 이름
    fn name(&self) -> &str;

    /// 모듈에 대해 빌드 도구 goal을 실행합니다.
    fn execute(&self, module: &Module, goal: &str) -> Result<(), StrataError>;
}

/// 구체적인 빌드 도구 어댑터가 없을 때 바인딩되는 대체 구현
///
/// 모든 goal을 기록만 하고 무시합니다.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBuildToolExecutor;

impl BuildToolExecutor for NoopBuildToolExecutor {
    fn name(&self) -> &str {
        "noop"
    }

    fn execute(&self, module: &Module, goal: &str) -> Result<(), StrataError> {
        debug!(module = module.key(), goal, "no build tool adapter bound, skipping goal");
        Ok(())
    }
}

/// 모듈 하나의 분석을 수행하는 trait
///
/// 스캔 순회기는 모듈마다 격리된 자식 scope를 만들어 이 trait에 넘깁니다.
/// 실행 중 바인딩한 컴포넌트는 해당 모듈 scope에만 보이며
/// 실행이 끝나면 바인딩 역순으로 해제됩니다.
pub trait ModuleExecutor: Send + Sync {
    /// 모듈을 분석합니다. 에러를 반환하면 남은 순회가 중단됩니다.
    fn execute(&self, module: &Module, scope: &mut Scope<'_>) -> Result<(), StrataError>;
}
