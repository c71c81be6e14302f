//! The spec-file metadata surface this crate consumes. Parsing actual RPM
//! spec files is out of scope here; [`SpecProvider`] is the seam an external
//! parser implements, passed in explicitly rather than reached for through a
//! process-global singleton.
use std::collections::HashMap;

use crate::{Pkgbase, Pkgname, Result, SchedulerError};

pub trait SpecProvider {
    fn base_pkg(&self, rpm: &Pkgname) -> Result<Pkgbase>;
    fn build_requires(&self, base: &Pkgbase) -> Result<Vec<Pkgname>>;
    fn check_build_requires(&self, base: &Pkgbase, version: &str) -> Result<Vec<Pkgname>>;
    fn requires(&self, rpm: &Pkgname) -> Result<Vec<Pkgname>>;
    fn sub_packages(&self, base: &Pkgbase) -> Result<Vec<Pkgname>>;
    fn highest_version(&self, base: &Pkgbase) -> Result<String>;
    fn list_packages(&self) -> Result<Vec<Pkgbase>>;
}

/// In-memory [`SpecProvider`] backed by plain maps, used by tests and
/// scenario fixtures. Not a production spec-file parser.
#[derive(Debug, Default, Clone)]
pub struct StaticSpecProvider {
    /// base -> rpms it produces
    sub_packages: HashMap<Pkgbase, Vec<Pkgname>>,
    /// rpm -> base it belongs to
    base_of: HashMap<Pkgname, Pkgbase>,
    /// base -> rpms needed to build it
    build_requires: HashMap<Pkgbase, Vec<Pkgname>>,
    /// rpm -> rpms needed to run it
    requires: HashMap<Pkgname, Vec<Pkgname>>,
    highest_version: HashMap<Pkgbase, String>,
}

impl StaticSpecProvider {
    pub fn builder() -> StaticSpecProviderBuilder {
        StaticSpecProviderBuilder::default()
    }
}

impl SpecProvider for StaticSpecProvider {
    fn base_pkg(&self, rpm: &Pkgname) -> Result<Pkgbase> {
        self.base_of
            .get(rpm)
            .cloned()
            .ok_or_else(|| SchedulerError::UnknownPackage(Pkgbase::from(rpm.as_ref())))
    }

    fn build_requires(&self, base: &Pkgbase) -> Result<Vec<Pkgname>> {
        self.build_requires
            .get(base)
            .cloned()
            .ok_or_else(|| SchedulerError::UnknownPackage(base.clone()))
    }

    fn check_build_requires(&self, _base: &Pkgbase, _version: &str) -> Result<Vec<Pkgname>> {
        Ok(Vec::new())
    }

    fn requires(&self, rpm: &Pkgname) -> Result<Vec<Pkgname>> {
        Ok(self.requires.get(rpm).cloned().unwrap_or_default())
    }

    fn sub_packages(&self, base: &Pkgbase) -> Result<Vec<Pkgname>> {
        self.sub_packages
            .get(base)
            .cloned()
            .ok_or_else(|| SchedulerError::UnknownPackage(base.clone()))
    }

    fn highest_version(&self, base: &Pkgbase) -> Result<String> {
        Ok(self
            .highest_version
            .get(base)
            .cloned()
            .unwrap_or_else(|| "0".to_string()))
    }

    fn list_packages(&self) -> Result<Vec<Pkgbase>> {
        let mut bases: Vec<_> = self.sub_packages.keys().cloned().collect();
        bases.sort();
        Ok(bases)
    }
}

/// Builds a [`StaticSpecProvider`] one base package at a time.
#[derive(Debug, Default)]
pub struct StaticSpecProviderBuilder {
    provider: StaticSpecProvider,
}

impl StaticSpecProviderBuilder {
    /// Register a base package with a single rpm of the same name, no
    /// sub-packages. Most test fixtures only need this.
    pub fn package(
        mut self,
        base: impl Into<Pkgbase>,
        build_requires: impl IntoIterator<Item = &'static str>,
        runtime_requires: impl IntoIterator<Item = &'static str>,
    ) -> Self {
        let base: Pkgbase = base.into();
        let rpm = Pkgname::from(base.as_ref());
        self.provider
            .sub_packages
            .insert(base.clone(), vec![rpm.clone()]);
        self.provider.base_of.insert(rpm.clone(), base.clone());
        self.provider.build_requires.insert(
            base,
            build_requires.into_iter().map(Pkgname::from).collect(),
        );
        self.provider.requires.insert(
            rpm,
            runtime_requires.into_iter().map(Pkgname::from).collect(),
        );
        self
    }

    /// Register a base package that produces several differently-named rpms,
    /// each with its own run-time requirements.
    pub fn package_with_subpackages(
        mut self,
        base: impl Into<Pkgbase>,
        build_requires: impl IntoIterator<Item = &'static str>,
        subpackages: impl IntoIterator<Item = (&'static str, Vec<&'static str>)>,
    ) -> Self {
        let base: Pkgbase = base.into();
        let mut rpms = Vec::new();
        for (name, runtime_requires) in subpackages {
            let rpm = Pkgname::from(name);
            self.provider.base_of.insert(rpm.clone(), base.clone());
            self.provider.requires.insert(
                rpm.clone(),
                runtime_requires.into_iter().map(Pkgname::from).collect(),
            );
            rpms.push(rpm);
        }
        self.provider.sub_packages.insert(base.clone(), rpms);
        self.provider.build_requires.insert(
            base,
            build_requires.into_iter().map(Pkgname::from).collect(),
        );
        self
    }

    pub fn build(self) -> StaticSpecProvider {
        self.provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_base_surfaces_as_unknown_package() {
        let provider = StaticSpecProvider::builder().package("a", [], []).build();
        let err = provider.build_requires(&Pkgbase::from("b")).unwrap_err();
        assert!(matches!(err, SchedulerError::UnknownPackage(_)));
    }

    #[test]
    fn sub_packages_round_trip() {
        let provider = StaticSpecProvider::builder()
            .package_with_subpackages(
                "glibc",
                [],
                [("glibc", vec![]), ("glibc-devel", vec!["glibc"])],
            )
            .build();
        assert_eq!(
            provider.base_pkg(&Pkgname::from("glibc-devel")).unwrap(),
            Pkgbase::from("glibc")
        );
        assert_eq!(
            provider.requires(&Pkgname::from("glibc-devel")).unwrap(),
            vec![Pkgname::from("glibc")]
        );
    }
}
