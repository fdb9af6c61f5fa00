//! 메트릭 상수 및 설명 등록
//!
//! 스캔 세션의 모든 메트릭 이름과 설명을 중앙에서 정의합니다.
//! 각 컴포넌트는 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//! recorder가 설치되지 않았으면 모든 호출은 아무 일도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `strata_`
//! - 영역: `session_`, `scan_`, `extensions_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency), 없음 (gauge)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 모듈 키 레이블
pub const LABEL_MODULE: &str = "module";

/// 세션 단계 레이블 (assemble, execute)
pub const LABEL_PHASE: &str = "phase";

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── 세션 메트릭 ───────────────────────────────────────────────────

/// 세션: 실행된 세션 수 (counter, label: result)
pub const SESSIONS_TOTAL: &str = "strata_sessions_total";

/// 세션: 단계별 소요 시간 (histogram, 초, label: phase)
pub const SESSION_PHASE_DURATION_SECONDS: &str = "strata_session_phase_duration_seconds";

// ─── 스캔 메트릭 ───────────────────────────────────────────────────

/// 스캔: 분석된 모듈 수 (counter, label: result)
pub const SCAN_MODULES_TOTAL: &str = "strata_scan_modules_total";

/// 스캔: 모듈별 분석 소요 시간 (histogram, 초)
pub const SCAN_MODULE_DURATION_SECONDS: &str = "strata_scan_module_duration_seconds";

/// 스캔: 해석된 트리의 모듈 수 (gauge)
pub const SCAN_TREE_MODULES: &str = "strata_scan_tree_modules";

// ─── 확장 메트릭 ───────────────────────────────────────────────────

/// 확장: 세션 scope에 설치된 확장 수 (counter)
pub const EXTENSIONS_INSTALLED_TOTAL: &str = "strata_extensions_installed_total";

/// 모든 메트릭 이름
pub const ALL_METRIC_NAMES: &[&str] = &[
    SESSIONS_TOTAL,
    SESSION_PHASE_DURATION_SECONDS,
    SCAN_MODULES_TOTAL,
    SCAN_MODULE_DURATION_SECONDS,
    SCAN_TREE_MODULES,
    EXTENSIONS_INSTALLED_TOTAL,
];

/// 모든 메트릭의 설명을 등록합니다.
///
/// recorder 설치 직후 한 번 호출합니다.
/// `metrics::describe_counter!()`, `describe_gauge!()`, `describe_histogram!()`을
/// 사용하여 exporter가 노출할 설명 텍스트를 등록합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    describe_counter!(SESSIONS_TOTAL, "Total scan sessions run, by result");
    describe_histogram!(
        SESSION_PHASE_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Duration of each scan session phase"
    );
    describe_counter!(SCAN_MODULES_TOTAL, "Total modules scanned, by result");
    describe_histogram!(
        SCAN_MODULE_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Time spent analysing a single module"
    );
    describe_gauge!(SCAN_TREE_MODULES, "Number of modules in the resolved project tree");
    describe_counter!(
        EXTENSIONS_INSTALLED_TOTAL,
        "Total batch extensions installed into session scopes"
    );
}
