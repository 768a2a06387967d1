//! Mood steering.
//!
//! Each slider's offset from neutral pushes the embedding along that axis's
//! direction vector, scaled by the axis weight:
//!
//! ```text
//! steered[i] = base[i] + Σ_axis direction_axis[i] · (slider_axis − 0.5) · weight_axis
//! ```
//!
//! The result is then L2-normalized. Contributions are accumulated per index
//! in axis order (energy, valence, tempo, texture) so the floating-point
//! result is reproducible.

use evoke_core::{DirectionVectorSet, Embedding, MoodAxis, MoodSliders};

/// Push `base` along the direction vectors without renormalizing.
///
/// A direction vector shorter than `base` contributes nothing past its end.
#[must_use]
pub fn perturb(base: &[f64], directions: &DirectionVectorSet, sliders: &MoodSliders) -> Embedding {
    base.iter()
        .enumerate()
        .map(|(i, &value)| {
            let adjustment = MoodAxis::ALL.iter().fold(0.0, |acc, &axis| {
                match directions.get(axis).get(i) {
                    Some(direction) => acc + direction * sliders.deflection(axis) * axis.weight(),
                    None => acc,
                }
            });
            value + adjustment
        })
        .collect()
}

/// Steer `base` toward the requested mood and renormalize to unit length.
///
/// With every slider at 0.5 this is plain normalization. If the perturbed
/// vector has zero norm it is returned as is, so the output is never NaN but
/// is not a unit vector either.
#[must_use]
pub fn steer(base: &[f64], directions: &DirectionVectorSet, sliders: &MoodSliders) -> Embedding {
    let perturbed = perturb(base, directions, sliders);
    let norm = perturbed.norm();

    if norm > 0.0 {
        perturbed.iter().map(|v| v / norm).collect()
    } else {
        log::debug!("Steered embedding has zero norm; skipping normalization");
        perturbed
    }
}
