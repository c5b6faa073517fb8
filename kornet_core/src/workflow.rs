//! Making a reaction network for a dataset and storing it
use thiserror::Error;
use tracing::info;

use crate::builder::{BuildError, BuildObserver, BuildReport, NetworkBuilder};
use crate::configuration::Configuration;
use crate::io::store::{AnnotationSource, NetworkMetadata, NetworkStore, StoreError};
use crate::network::entity::EntityKind;
use crate::network::grouping::EntityNetwork;
use crate::reference::AliasTables;
use crate::utils::hashing::annotation_fingerprint;

/// Options for [`make_network`]
#[derive(Clone, Copy, Debug)]
pub struct MakeOptions {
    pub kind: EntityKind,
    /// Replace a network already in the store
    pub overwrite_existing_network: bool,
}

impl Default for MakeOptions {
    fn default() -> Self {
        MakeOptions {
            kind: EntityKind::Gene,
            overwrite_existing_network: false,
        }
    }
}

impl From<&Configuration> for MakeOptions {
    fn from(config: &Configuration) -> Self {
        MakeOptions {
            kind: config.entity_kind,
            overwrite_existing_network: config.overwrite_existing_network,
        }
    }
}

/// Make a network from the annotations of `source` and store it in `store`
///
/// Fails before anything is written if the store already has a network and overwriting was
/// not requested. An existing network is replaced by [`NetworkStore::store_network`] in one
/// step, so a failed write leaves it in place.
pub fn make_network<S, T>(
    source: &S,
    store: &mut T,
    tables: &AliasTables,
    options: MakeOptions,
    observer: &mut dyn BuildObserver,
) -> Result<(EntityNetwork, BuildReport), WorkflowError>
where
    S: AnnotationSource + ?Sized,
    T: NetworkStore + ?Sized,
{
    if store.network_exists() && !options.overwrite_existing_network {
        return Err(WorkflowError::NetworkAlreadyStored);
    }

    let annotations = source.ko_annotations()?;
    let fingerprint = annotation_fingerprint(&annotations);
    let (network, report) = NetworkBuilder::build(tables, options.kind, &annotations, observer)?;

    let metadata = NetworkMetadata {
        annotation_fingerprint: fingerprint,
        kegg_release: tables.kegg_release().to_string(),
        modelseed_sha: tables.modelseed_sha().to_string(),
    };
    if store.network_exists() {
        info!("replacing the existing reaction network");
    }
    store.store_network(
        network.network.reaction_table(),
        network.network.metabolite_table(),
        metadata,
    )?;
    Ok((network, report))
}

/// Why a stored network no longer matches the current data
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StaleReason {
    AnnotationsChanged,
    KeggReleaseChanged { stored: String, current: String },
    ModelSeedChanged { stored: String, current: String },
}

/// Whether a store's network was made from the current annotations and reference data
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetworkStatus {
    Absent,
    Current,
    Stale(Vec<StaleReason>),
}

/// Compare a store's network metadata against current annotations and reference tables
pub fn network_status<T, S>(
    store: &T,
    source: &S,
    tables: &AliasTables,
) -> Result<NetworkStatus, WorkflowError>
where
    T: NetworkStore + ?Sized,
    S: AnnotationSource + ?Sized,
{
    let Some(stored) = store.stored_metadata() else {
        return Ok(NetworkStatus::Absent);
    };
    let fingerprint = annotation_fingerprint(&source.ko_annotations()?);
    let mut reasons = Vec::new();
    if stored.annotation_fingerprint != fingerprint {
        reasons.push(StaleReason::AnnotationsChanged);
    }
    if stored.kegg_release != tables.kegg_release() {
        reasons.push(StaleReason::KeggReleaseChanged {
            stored: stored.kegg_release.clone(),
            current: tables.kegg_release().to_string(),
        });
    }
    if stored.modelseed_sha != tables.modelseed_sha() {
        reasons.push(StaleReason::ModelSeedChanged {
            stored: stored.modelseed_sha.clone(),
            current: tables.modelseed_sha().to_string(),
        });
    }
    if reasons.is_empty() {
        Ok(NetworkStatus::Current)
    } else {
        Ok(NetworkStatus::Stale(reasons))
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(
        "A reaction network is already stored; it must be explicitly overwritten to make a new one"
    )]
    NetworkAlreadyStored,
    #[error("Unable to build the reaction network")]
    Build(#[from] BuildError),
    #[error("Store error")]
    Store(#[from] StoreError),
}
