//! 컴포넌트 scope — 부모 체인 조회를 지원하는 싱글턴 레지스트리
//!
//! [`Scope`]는 컴포넌트 식별자([`ComponentKey`])마다 정확히 하나의 인스턴스를
//! 보관합니다. 선택적으로 부모 scope를 참조하며, 조회는 로컬 바인딩에서
//! 시작하여 부모 체인을 따라 올라갑니다. 부모는 읽기 전용으로만 사용되며
//! 자식 scope의 변경은 부모에 영향을 주지 않습니다.
//!
//! # 생명주기
//! ```text
//! Scope::new("session")
//!   └─ child("module:a")   ← 부모보다 먼저 해제됨 (borrow 규칙으로 보장)
//!        bind(A), bind(B)
//!        drop → B.release(), A.release()   (바인딩 역순)
//! ```

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;

use tracing::trace;

use crate::error::ScopeError;
use crate::pipeline::Component;

// ─── ComponentKey ────────────────────────────────────────────────────

/// 컴포넌트 식별자
///
/// 타입 식별자와 선택적 한정자(이름)로 구성됩니다.
/// 동일 타입의 여러 인스턴스(예: 확장)는 한정자로 구분합니다.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ComponentKey {
    type_id: TypeId,
    type_name: &'static str,
    qualifier: Option<String>,
}

impl ComponentKey {
    /// 타입 `T`의 기본(이름 없는) 키
    pub fn of<T: Any>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            qualifier: None,
        }
    }

    /// 타입 `T`의 이름 있는 키
    pub fn named<T: Any>(name: impl Into<String>) -> Self {
        Self {
            qualifier: Some(name.into()),
            ..Self::of::<T>()
        }
    }

    /// 한정자 (이름 있는 바인딩일 때)
    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(name) => write!(f, "{}#{name}", self.type_name),
            None => write!(f, "{}", self.type_name),
        }
    }
}

impl fmt::Debug for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentKey({self})")
    }
}

// ─── Binding ─────────────────────────────────────────────────────────

type Instance = Box<dyn Any + Send + Sync>;
type ReleaseHook = fn(&(dyn Any + Send + Sync + 'static));

struct Binding {
    key: ComponentKey,
    instance: Instance,
    release: Option<ReleaseHook>,
}

// ─── Scope ───────────────────────────────────────────────────────────

/// 중첩 가능한 컴포넌트 레지스트리
///
/// 부모 참조는 소유가 아닌 조회 전용입니다. `'p`는 부모 scope의 수명이며,
/// 자식 scope는 부모보다 오래 살 수 없습니다.
///
/// # 사용 예시
/// ```
/// use strata_core::scope::Scope;
///
/// let mut session = Scope::new("session");
/// session.bind(42_u32).unwrap();
///
/// let mut module = session.child("module:app");
/// module.bind("local").unwrap();
///
/// assert_eq!(module.lookup::<u32>(), Some(&42));
/// assert_eq!(module.lookup::<&str>(), Some(&"local"));
/// drop(module);
/// assert!(session.lookup::<&str>().is_none());
/// ```
pub struct Scope<'p> {
    label: String,
    parent: Option<&'p Scope<'p>>,
    bindings: Vec<Binding>,
    index: HashMap<ComponentKey, usize>,
}

impl Scope<'static> {
    /// 부모가 없는 루트 scope를 생성합니다.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            parent: None,
            bindings: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<'p> Scope<'p> {
    /// 이 scope를 부모로 하는 자식 scope를 생성합니다.
    pub fn child(&self, label: impl Into<String>) -> Scope<'_> {
        Scope {
            label: label.into(),
            parent: Some(self),
            bindings: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// scope 이름
    pub fn label(&self) -> &str {
        &self.label
    }

    /// 부모 scope
    pub fn parent(&self) -> Option<&'p Scope<'p>> {
        self.parent
    }

    /// 루트로부터의 깊이 (루트는 0)
    pub fn depth(&self) -> usize {
        self.ancestors().count() - 1
    }

    /// 로컬 바인딩 수
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// 로컬 바인딩이 없는지 여부
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// 로컬 바인딩 키 (바인딩 순서)
    pub fn keys(&self) -> impl Iterator<Item = &ComponentKey> {
        self.bindings.iter().map(|b| &b.key)
    }

    /// 자기 자신부터 루트까지의 scope 체인
    pub fn ancestors<'a>(&'a self) -> impl Iterator<Item = &'a Scope<'a>> + 'a {
        let mut current: Option<&'a Scope<'a>> = Some(self);
        std::iter::from_fn(move || {
            let scope = current?;
            current = scope.parent;
            Some(scope)
        })
    }

    // ── 바인딩 ──

    /// 타입 `T`의 인스턴스를 로컬에 바인딩합니다.
    ///
    /// 같은 키가 이미 로컬에 바인딩되어 있으면 에러를 반환합니다.
    /// 조상 scope의 바인딩은 가립니다(shadowing).
    pub fn bind<T: Any + Send + Sync>(&mut self, value: T) -> Result<(), ScopeError> {
        self.insert(ComponentKey::of::<T>(), Box::new(value), None)
    }

    /// 이름을 붙여 타입 `T`의 인스턴스를 로컬에 바인딩합니다.
    pub fn bind_named<T: Any + Send + Sync>(
        &mut self,
        name: impl Into<String>,
        value: T,
    ) -> Result<(), ScopeError> {
        self.insert(ComponentKey::named::<T>(name), Box::new(value), None)
    }

    /// 해제 훅을 가진 컴포넌트를 바인딩합니다.
    ///
    /// scope가 해제될 때 [`Component::release`]가 바인딩 역순으로 호출됩니다.
    pub fn bind_component<T: Component>(&mut self, value: T) -> Result<(), ScopeError> {
        self.insert(
            ComponentKey::of::<T>(),
            Box::new(value),
            Some(release_hook::<T> as ReleaseHook),
        )
    }

    /// 이름을 붙여 해제 훅을 가진 컴포넌트를 바인딩합니다.
    pub fn bind_named_component<T: Component>(
        &mut self,
        name: impl Into<String>,
        value: T,
    ) -> Result<(), ScopeError> {
        self.insert(
            ComponentKey::named::<T>(name),
            Box::new(value),
            Some(release_hook::<T> as ReleaseHook),
        )
    }

    fn insert(
        &mut self,
        key: ComponentKey,
        instance: Instance,
        release: Option<ReleaseHook>,
    ) -> Result<(), ScopeError> {
        if self.index.contains_key(&key) {
            return Err(ScopeError::AlreadyBound {
                component: key.to_string(),
                scope: self.label.clone(),
            });
        }
        trace!(scope = %self.label, component = %key, "component bound");
        self.index.insert(key.clone(), self.bindings.len());
        self.bindings.push(Binding {
            key,
            instance,
            release,
        });
        Ok(())
    }

    // ── 조회 ──

    /// 타입 `T`를 로컬에서만 조회합니다.
    pub fn lookup_local<T: Any>(&self) -> Option<&T> {
        self.get_local(&ComponentKey::of::<T>())
    }

    /// 타입 `T`를 조회합니다. 로컬에 없으면 부모 체인을 따라 올라갑니다.
    pub fn lookup<T: Any>(&self) -> Option<&T> {
        self.get(&ComponentKey::of::<T>())
    }

    /// 이름 있는 타입 `T`를 체인에서 조회합니다.
    pub fn lookup_named<T: Any>(&self, name: &str) -> Option<&T> {
        self.get(&ComponentKey::named::<T>(name))
    }

    /// 타입 `T`가 체인 어딘가에 바인딩되어 있는지 여부
    pub fn contains<T: Any>(&self) -> bool {
        self.lookup::<T>().is_some()
    }

    /// 이름 있는 타입 `T`가 체인 어딘가에 바인딩되어 있는지 여부
    pub fn contains_named<T: Any>(&self, name: &str) -> bool {
        self.lookup_named::<T>(name).is_some()
    }

    /// 타입 `T`를 조회하고, 없으면 [`ScopeError::Missing`]을 반환합니다.
    pub fn require<T: Any>(&self) -> Result<&T, ScopeError> {
        self.lookup::<T>().ok_or_else(|| ScopeError::Missing {
            component: type_name::<T>().to_owned(),
            scope: self.label.clone(),
        })
    }

    fn get<T: Any>(&self, key: &ComponentKey) -> Option<&T> {
        self.ancestors().find_map(|scope| scope.get_local(key))
    }

    fn get_local<T: Any>(&self, key: &ComponentKey) -> Option<&T> {
        let idx = *self.index.get(key)?;
        self.bindings[idx].instance.downcast_ref::<T>()
    }
}

fn release_hook<T: Component>(instance: &(dyn Any + Send + Sync + 'static)) {
    if let Some(component) = instance.downcast_ref::<T>() {
        component.release();
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        while let Some(binding) = self.bindings.pop() {
            if let Some(release) = binding.release {
                release(binding.instance.as_ref());
            }
            trace!(scope = %self.label, component = %binding.key, "component released");
        }
        self.index.clear();
    }
}

impl fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("label", &self.label)
            .field("parent", &self.parent.map(Scope::label))
            .field("bindings", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}
