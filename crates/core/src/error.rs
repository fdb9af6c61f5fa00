//! 에러 타입 — 도메인별 에러 정의

/// Strata 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum StrataError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// scope 바인딩/조회 에러
    #[error("scope error: {0}")]
    Scope(#[from] ScopeError),

    /// 프로젝트 트리 구성 에러
    #[error("tree error: {0}")]
    Tree(#[from] TreeError),

    /// 확장 등록 에러
    #[error("extension error: {0}")]
    Extension(#[from] ExtensionError),

    /// 스캔 실행 에러
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// 부트스트래퍼가 사용할 수 없는 프로젝트 트리를 반환함 (치명적)
    #[error("bootstrapper '{bootstrapper}' has returned an invalid (null or empty) project tree")]
    InvalidProjectTree { bootstrapper: String },
}

/// scope 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ScopeError {
    /// 같은 scope에 동일한 키가 이미 바인딩되어 있음
    #[error("component '{component}' is already bound in scope '{scope}'")]
    AlreadyBound { component: String, scope: String },

    /// scope 체인 어디에도 바인딩이 없음
    #[error("component '{component}' is not bound in scope '{scope}' or its ancestors")]
    Missing { component: String, scope: String },
}

/// 프로젝트 트리 구성 에러
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// 모듈 키가 트리에 두 번 이상 등장함
    #[error("module '{key}' appears more than once in the project tree")]
    DuplicateModule { key: String },

    /// 모듈 정의가 자기 자신을 (간접적으로) 참조함
    #[error("cyclic module definition: {path}")]
    CyclicModule { path: String },

    /// 비어 있는 모듈 키
    #[error("module key must not be empty")]
    EmptyKey,
}

/// 확장 등록 에러
#[derive(Debug, thiserror::Error)]
pub enum ExtensionError {
    /// 동일한 이름의 확장이 이미 등록되어 있음
    #[error("extension already registered: {name}")]
    AlreadyRegistered { name: String },
}

/// 스캔 실행 에러
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// 모듈 분석 실패
    #[error("module '{module}' failed: {reason}")]
    ModuleFailed { module: String, reason: String },

    /// 모듈 분석 중 다른 도메인 에러 발생 (원인 에러 보존)
    #[error("module '{module}' failed: {source}")]
    ModuleAborted {
        module: String,
        #[source]
        source: Box<StrataError>,
    },

    /// 세션 단계 순서 위반
    #[error("cannot {operation} a session in phase '{phase}'")]
    InvalidPhase { operation: String, phase: String },
}
