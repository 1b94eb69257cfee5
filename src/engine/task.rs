use crate::{
    classfile::decode_class_with,
    engine::config::{CancellationToken, ScanConfig},
    profile::{profile_class, ClassProfile},
    report::{FileError, FileOutcome, Finding, MatchedReference},
    rules::RuleCatalog,
    scanner::scan_method,
    Error, Result,
};

/// One class file handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInput {
    /// Identity of the file, unique per input (e.g. `app.jar!/com/acme/Foo.class`)
    pub identity: String,
    /// The complete class file
    pub bytes: Vec<u8>,
}

impl ClassInput {
    /// Pair an identity with the file's bytes.
    #[must_use]
    pub fn new(identity: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        ClassInput {
            identity: identity.into(),
            bytes: bytes.into(),
        }
    }
}

/// Decode, scan and match one class file.
///
/// This is the map step of a scan run. It never fails: decode and scan errors become
/// [`FileOutcome::Failed`], and a cancellation observed before or during the scan becomes
/// [`FileOutcome::Cancelled`] with every partial finding dropped.
///
/// # Examples
///
/// ```rust
/// use jarscope::{
///     engine::{scan_class, CancellationToken, ScanConfig},
///     report::FileOutcome,
///     rules::RuleCatalog,
/// };
///
/// let outcome = scan_class(
///     "broken.class",
///     &[0xCA, 0xFE, 0xBA],
///     &RuleCatalog::empty(),
///     &ScanConfig::default(),
///     &CancellationToken::new(),
/// );
/// assert!(matches!(outcome, FileOutcome::Failed(_)));
/// ```
#[must_use]
pub fn scan_class(
    identity: &str,
    bytes: &[u8],
    catalog: &RuleCatalog,
    config: &ScanConfig,
    cancel: &CancellationToken,
) -> FileOutcome {
    match try_scan_class(identity, bytes, catalog, config, cancel) {
        Ok((findings, profile)) => FileOutcome::Scanned {
            file: identity.to_string(),
            findings,
            profile,
        },
        Err(Error::Cancelled) => FileOutcome::Cancelled {
            file: identity.to_string(),
        },
        Err(error) => FileOutcome::Failed(FileError {
            file: identity.to_string(),
            error,
        }),
    }
}

fn try_scan_class(
    identity: &str,
    bytes: &[u8],
    catalog: &RuleCatalog,
    config: &ScanConfig,
    cancel: &CancellationToken,
) -> Result<(Vec<Finding>, Option<ClassProfile>)> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }

    let class = decode_class_with(bytes, &config.decoder)?;

    let mut findings = Vec::new();
    for method in &class.methods {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        for item in scan_method(&class, method) {
            let (offset, reference) = item?;
            for rule_id in catalog.match_reference(&reference) {
                findings.push(Finding {
                    rule_id: rule_id.to_string(),
                    file: identity.to_string(),
                    class_name: class.this_class.clone(),
                    method: method.name.clone(),
                    method_descriptor: method.descriptor.clone(),
                    offset,
                    reference: MatchedReference::from(&reference),
                });
            }
        }
    }

    let profile = match &config.profile {
        Some(profile_config) => Some(profile_class(&class, profile_config)?),
        None => None,
    };

    log::debug!(
        "{identity}: {} findings in {} methods of {}",
        findings.len(),
        class.methods.len(),
        class.this_class
    );
    Ok((findings, profile))
}
