//! 도메인 타입 — 분석 대상 프로젝트 트리
//!
//! [`ProjectTree`]는 세션 동안 분석할 [`Module`] 계층을 나타냅니다.
//! 트리는 생성 시점에 검증되며 이후에는 읽기 전용입니다.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::TreeError;

/// 프로젝트 트리의 한 노드 (프로젝트 또는 하위 프로젝트)
///
/// 자식 목록의 순서는 순회 순서이자 표시 순서입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    key: String,
    name: String,
    base_dir: Option<PathBuf>,
    #[serde(default)]
    properties: BTreeMap<String, String>,
    #[serde(default)]
    children: Vec<Module>,
}

impl Module {
    /// 주어진 키로 자식이 없는 모듈을 생성합니다. 이름은 키로 초기화됩니다.
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            name: key.clone(),
            key,
            base_dir: None,
            properties: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// 표시 이름을 설정합니다.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 기준 디렉토리를 설정합니다.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    /// 모듈 속성을 추가합니다.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// 자식 모듈을 마지막 위치에 추가합니다.
    pub fn with_child(mut self, child: Module) -> Self {
        self.children.push(child);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// 모듈 속성 값을 조회합니다.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// 자식 모듈 (저장된 순서)
    pub fn children(&self) -> &[Module] {
        &self.children
    }

    /// 자식이 없는 모듈인지 여부
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name == self.key {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{} ({})", self.name, self.key)
        }
    }
}

/// 세션 동안 분석할 모듈 계층
///
/// # 불변식
/// - 모든 모듈 키는 비어 있지 않고 트리 전체에서 유일합니다.
/// - 생성 이후 변경할 수 없습니다.
/// - 소유 구조이므로 순환이 존재할 수 없습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectTree {
    root: Module,
    size: usize,
}

impl ProjectTree {
    /// 루트 모듈로 트리를 생성하고 불변식을 검증합니다.
    pub fn new(root: Module) -> Result<Self, TreeError> {
        let size = {
            let mut seen = HashSet::new();
            validate(&root, &mut seen)?;
            seen.len()
        };
        Ok(Self { root, size })
    }

    /// 루트 모듈
    pub fn root(&self) -> &Module {
        &self.root
    }

    /// 트리에 포함된 모듈 수
    pub fn len(&self) -> usize {
        self.size
    }

    /// 항상 `false`: 트리는 최소한 루트를 가집니다.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// 키로 모듈을 찾습니다.
    pub fn find(&self, key: &str) -> Option<&Module> {
        self.iter().find(|m| m.key == key)
    }

    /// 후위 순회(자식 왼쪽→오른쪽, 그 다음 부모) 순서의 모듈 반복자
    pub fn iter(&self) -> PostOrder<'_> {
        PostOrder {
            stack: vec![(&self.root, 0)],
        }
    }

    /// 후위 순회 순서의 모듈 키 목록
    pub fn keys(&self) -> Vec<&str> {
        self.iter().map(Module::key).collect()
    }
}

impl<'de> Deserialize<'de> for ProjectTree {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            root: Module,
        }

        let raw = Raw::deserialize(deserializer)?;
        ProjectTree::new(raw.root).map_err(serde::de::Error::custom)
    }
}

fn validate<'a>(module: &'a Module, seen: &mut HashSet<&'a str>) -> Result<(), TreeError> {
    if module.key.trim().is_empty() {
        return Err(TreeError::EmptyKey);
    }
    if !seen.insert(module.key.as_str()) {
        return Err(TreeError::DuplicateModule {
            key: module.key.clone(),
        });
    }
    for child in &module.children {
        validate(child, seen)?;
    }
    Ok(())
}

/// [`ProjectTree::iter`]가 반환하는 후위 순회 반복자
pub struct PostOrder<'a> {
    stack: Vec<(&'a Module, usize)>,
}

impl<'a> Iterator for PostOrder<'a> {
    type Item = &'a Module;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (module, next_child) = self.stack.last_mut()?;
            let module: &'a Module = *module;
            if let Some(child) = module.children.get(*next_child) {
                *next_child += 1;
                self.stack.push((child, 0));
            } else {
                self.stack.pop();
                return Some(module);
            }
        }
    }
}
