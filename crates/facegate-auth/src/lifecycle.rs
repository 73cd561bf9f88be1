//! Matcher lifecycle: rebuild the match index from scratch on every
//! directory change.

use crate::identity;
use crate::orchestrator::Shared;
use crate::session::MatcherStatus;
use facegate_core::{LabeledDescriptors, RegisteredIdentity};
use std::sync::Arc;

/// Group identities into one labeled entry per display name.
///
/// Names are compared trimmed and case-insensitively, the same rule the
/// authenticator uses to accept a match.
pub fn gallery_for(directory: &[Arc<RegisteredIdentity>]) -> Vec<LabeledDescriptors> {
    let mut gallery: Vec<LabeledDescriptors> = Vec::new();
    for identity in directory {
        let label = identity.display_name.trim();
        match gallery
            .iter_mut()
            .find(|entry| entry.label.to_lowercase() == label.to_lowercase())
        {
            Some(entry) => entry.descriptors.push(identity.descriptor.clone()),
            None => gallery.push(LabeledDescriptors {
                label: label.to_string(),
                descriptors: vec![identity.descriptor.clone()],
            }),
        }
    }
    gallery
}

pub(crate) async fn rebuild(shared: &Shared, identities: Vec<RegisteredIdentity>) {
    let directory: Vec<Arc<RegisteredIdentity>> = identities.into_iter().map(Arc::new).collect();
    let gallery = gallery_for(&directory);
    let empty = gallery.is_empty();
    let count = directory.len();

    let generation = shared.update(|state| {
        state.generation += 1;
        state.index = None;
        state.directory = directory;
        state.session.matcher_status = if empty {
            MatcherStatus::Empty
        } else {
            MatcherStatus::Loading
        };
        identity::resolve(&mut state.session, &state.directory);
        state.generation
    });
    let Some(generation) = generation else {
        return;
    };

    if empty {
        tracing::info!(generation, "directory empty; face matcher cleared");
        return;
    }

    tracing::info!(generation, identities = count, "building face matcher");

    match shared
        .engine
        .build_match_index(gallery, shared.config.match_threshold)
        .await
    {
        Ok(index) => {
            let installed = shared.update(|state| {
                if state.generation != generation {
                    return false;
                }
                state.index = Some(index);
                state.session.matcher_status = MatcherStatus::Ready;
                true
            });
            match installed {
                Some(true) => tracing::info!(generation, "face matcher ready"),
                Some(false) => tracing::debug!(generation, "superseded match index dropped"),
                None => {}
            }
        }
        Err(err) => {
            tracing::error!(generation, error = %err, "failed to build match index");
            shared.update(|state| {
                if state.generation == generation {
                    state.session.matcher_status = MatcherStatus::Empty;
                }
            });
        }
    }
}
