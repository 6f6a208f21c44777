use crate::checks;
use crate::error::ConfigError;
use crate::model::Indicator;
use crate::policy::{EvaluatorConfig, ExpectedSignature, RootPolicy};
use crate::probe::{BuildMetadataProbe, DebugProbe, FilesystemProbe, PackageProbe, ProcessProbe};
use crate::report::IntegrityReport;
use std::sync::Arc;

/// The five capability providers an evaluation reads from.
#[derive(Clone)]
pub struct Probes {
    pub fs: Arc<dyn FilesystemProbe>,
    pub packages: Arc<dyn PackageProbe>,
    pub process: Arc<dyn ProcessProbe>,
    pub build: Arc<dyn BuildMetadataProbe>,
    pub debug: Arc<dyn DebugProbe>,
}

/// Facade over the detectors.
///
/// Holds no results between calls: every `evaluate` re-probes the device.
#[derive(Clone)]
pub struct Evaluator {
    probes: Probes,
    config: EvaluatorConfig,
}

impl Evaluator {
    pub fn builder() -> EvaluatorBuilder {
        EvaluatorBuilder::default()
    }

    pub fn new(probes: Probes, config: EvaluatorConfig) -> Result<Self, ConfigError> {
        config.root.validate()?;
        Ok(Self { probes, config })
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Run the four detectors one after another and aggregate.
    pub fn evaluate(&self) -> IntegrityReport {
        let report = IntegrityReport::from_indicators(
            self.root(),
            self.tamper(),
            self.emulator(),
            self.debugger(),
        );
        log_report(&report);
        report
    }

    /// Same result as [`Evaluator::evaluate`], with detectors running on the rayon pool.
    pub fn evaluate_concurrent(&self) -> IntegrityReport {
        let ((root, tamper), (emulator, debugger)) = rayon::join(
            || rayon::join(|| self.root(), || self.tamper()),
            || rayon::join(|| self.emulator(), || self.debugger()),
        );
        let report = IntegrityReport::from_indicators(root, tamper, emulator, debugger);
        log_report(&report);
        report
    }

    fn root(&self) -> Indicator {
        checks::detect_root(
            self.probes.fs.as_ref(),
            self.probes.packages.as_ref(),
            self.probes.process.as_ref(),
            self.probes.build.as_ref(),
            &self.config.root,
        )
    }

    fn tamper(&self) -> Indicator {
        checks::detect_tamper(
            self.probes.packages.as_ref(),
            &self.config.expected_signature,
        )
    }

    fn emulator(&self) -> Indicator {
        checks::detect_emulator(self.probes.build.as_ref())
    }

    fn debugger(&self) -> Indicator {
        checks::detect_debugger(self.probes.debug.as_ref())
    }
}

fn log_report(report: &IntegrityReport) {
    tracing::info!(
        threat_level = %report.threat_level(),
        rooted = report.is_rooted(),
        tampered = report.is_tampered(),
        emulator = report.is_emulator(),
        debugging = report.is_debugging(),
        "integrity evaluated"
    );
}

/// Collects providers and configuration; [`EvaluatorBuilder::build`] refuses to produce an
/// evaluator with anything missing.
#[derive(Default)]
pub struct EvaluatorBuilder {
    fs: Option<Arc<dyn FilesystemProbe>>,
    packages: Option<Arc<dyn PackageProbe>>,
    process: Option<Arc<dyn ProcessProbe>>,
    build: Option<Arc<dyn BuildMetadataProbe>>,
    debug: Option<Arc<dyn DebugProbe>>,
    expected_signature: Option<ExpectedSignature>,
    root: Option<RootPolicy>,
}

impl EvaluatorBuilder {
    pub fn filesystem(mut self, probe: Arc<dyn FilesystemProbe>) -> Self {
        self.fs = Some(probe);
        self
    }

    pub fn packages(mut self, probe: Arc<dyn PackageProbe>) -> Self {
        self.packages = Some(probe);
        self
    }

    pub fn process(mut self, probe: Arc<dyn ProcessProbe>) -> Self {
        self.process = Some(probe);
        self
    }

    pub fn build_metadata(mut self, probe: Arc<dyn BuildMetadataProbe>) -> Self {
        self.build = Some(probe);
        self
    }

    pub fn debug(mut self, probe: Arc<dyn DebugProbe>) -> Self {
        self.debug = Some(probe);
        self
    }

    pub fn probes(self, probes: Probes) -> Self {
        self.filesystem(probes.fs)
            .packages(probes.packages)
            .process(probes.process)
            .build_metadata(probes.build)
            .debug(probes.debug)
    }

    pub fn expected_signature(mut self, expected: ExpectedSignature) -> Self {
        self.expected_signature = Some(expected);
        self
    }

    pub fn root_policy(mut self, policy: RootPolicy) -> Self {
        self.root = Some(policy);
        self
    }

    pub fn config(self, config: EvaluatorConfig) -> Self {
        self.expected_signature(config.expected_signature)
            .root_policy(config.root)
    }

    pub fn build(self) -> Result<Evaluator, ConfigError> {
        let probes = Probes {
            fs: self.fs.ok_or(ConfigError::MissingProbe("filesystem"))?,
            packages: self.packages.ok_or(ConfigError::MissingProbe("package"))?,
            process: self.process.ok_or(ConfigError::MissingProbe("process"))?,
            build: self.build.ok_or(ConfigError::MissingProbe("build metadata"))?,
            debug: self.debug.ok_or(ConfigError::MissingProbe("debug"))?,
        };
        let expected_signature = self
            .expected_signature
            .ok_or(ConfigError::MissingExpectedSignature)?;
        let config = EvaluatorConfig {
            expected_signature,
            root: self.root.unwrap_or_default(),
        };
        Evaluator::new(probes, config)
    }
}
