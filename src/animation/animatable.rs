use crate::value::MotionValue;

/// Types that can be blended between two endpoints.
pub trait Animatable: Clone + PartialEq + 'static {
    /// `t = 0` yields `from`, `t = 1` yields `to`; values outside `[0, 1]`
    /// extrapolate, which overshooting curves rely on.
    fn lerp(from: &Self, to: &Self, t: f32) -> Self;
}

impl Animatable for f32 {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        from + (to - from) * t
    }
}

impl Animatable for f64 {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        from + (to - from) * t as f64
    }
}

/// Piecewise-linear mapping of `input` through matching `input_range` and
/// `output_range` stops. Inputs beyond either end clamp to the end stop.
///
/// Returns `None` when the ranges are empty or of different lengths.
pub fn interpolate<T: Animatable>(input_range: &[f32], output_range: &[T], input: f32) -> Option<T> {
    if input_range.is_empty() || input_range.len() != output_range.len() {
        return None;
    }
    let last = input_range.len() - 1;
    if input <= input_range[0] || last == 0 {
        return Some(output_range[0].clone());
    }
    if input >= input_range[last] {
        return Some(output_range[last].clone());
    }

    let segment = input_range
        .windows(2)
        .position(|w| input >= w[0] && input <= w[1])
        .unwrap_or(last - 1);
    let (start, end) = (input_range[segment], input_range[segment + 1]);
    let span = end - start;
    let t = if span.abs() < f32::EPSILON {
        1.0
    } else {
        (input - start) / span
    };
    Some(T::lerp(&output_range[segment], &output_range[segment + 1], t))
}

/// Derive a value from `source` through [`interpolate`].
///
/// Mismatched ranges are a developer error: it is logged and the derived
/// value pins to the first output stop (or `fallback` when there is none).
pub fn use_transform<T: Animatable>(
    source: &MotionValue<f32>,
    input_range: Vec<f32>,
    output_range: Vec<T>,
    fallback: T,
) -> MotionValue<T> {
    if input_range.len() != output_range.len() {
        log::warn!(
            "use_transform: {} input stops but {} output stops",
            input_range.len(),
            output_range.len()
        );
    }
    let pinned = output_range.first().cloned().unwrap_or(fallback);
    source.map(move |value| {
        interpolate(&input_range, &output_range, *value).unwrap_or_else(|| pinned.clone())
    })
}
