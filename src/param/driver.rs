use crate::definition::model::{
    AppearanceConfig, DrivenLinkDefinition, DriverDefinition, WearableCategory,
};
use crate::foundation::core::ParamId;

/// Where a bound driven parameter lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamLocation {
    /// The top wearable of a category owns the clone.
    Wearable(WearableCategory),
    /// The shared registry owns the parameter.
    Registry,
}

/// A driven link whose id could not be resolved to a live parameter.
///
/// Recorded, not fatal: propagation for the failed link is skipped while
/// every other link still applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkFailure {
    /// The driving parameter.
    pub driver_id: ParamId,
    /// The driven id that failed to resolve.
    pub driven_id: ParamId,
}

#[derive(Clone, Debug)]
struct DrivenEntry {
    link: DrivenLinkDefinition,
    driven_category: Option<WearableCategory>,
    binding: Option<ParamLocation>,
}

/// A computed driven-parameter update produced by [`DriverParam::propagate`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrivenUpdate {
    /// The driven parameter.
    pub driven_id: ParamId,
    /// Where the bound parameter lives.
    pub location: ParamLocation,
    /// The remapped weight to apply.
    pub value: f32,
}

/// A parameter that remaps its own weight onto a set of driven parameters
/// through a 4-point piecewise-linear curve.
///
/// The curve over driver weight `x` with breakpoints `min1 <= max1 <= max2
/// <= min2` and driven bounds `(dmin, dmax)`: floor at `dmin` below `min1`,
/// up-slope to `dmax` across `[min1, max1]`, plateau across `[max1, max2]`,
/// down-slope back to `dmin` across `[max2, min2]`, ceiling past `min2`.
/// Extrapolation instead of flat clamping applies only when a breakpoint
/// coincides exactly with the driver's own bound (lower bound when not
/// animating, upper bound when animating) so that driven parameters settle
/// exactly at their endpoint when an animated driver reaches its own.
#[derive(Clone, Debug)]
pub struct DriverParam {
    driver_id: ParamId,
    category: WearableCategory,
    entries: Vec<DrivenEntry>,
}

impl DriverParam {
    /// Build a driver from its definition, capturing each driven
    /// parameter's own category from the config. Links start unbound.
    pub fn from_config(def: &DriverDefinition, config: &AppearanceConfig) -> Self {
        let entries = def
            .driven
            .iter()
            .map(|link| DrivenEntry {
                link: *link,
                driven_category: config.parameter(link.driven_id).map(|p| p.category),
                binding: None,
            })
            .collect();
        Self {
            driver_id: def.driver_id,
            category: def.category,
            entries,
        }
    }

    /// The driving parameter's id.
    pub fn driver_id(&self) -> ParamId {
        self.driver_id
    }

    /// The category hosting the driver.
    pub fn category(&self) -> WearableCategory {
        self.category
    }

    /// Ids of every driven parameter, bound or not.
    pub fn driven_ids(&self) -> Vec<ParamId> {
        self.entries.iter().map(|e| e.link.driven_id).collect()
    }

    /// True if this driver must re-propagate when `category`'s composition
    /// changes: its own category matches, or any driven parameter belongs
    /// to that category.
    pub fn affects_category(&self, category: WearableCategory) -> bool {
        self.category == category
            || self
                .entries
                .iter()
                .any(|e| e.driven_category == Some(category))
    }

    /// Bind each driven id to a live parameter location via the
    /// caller-supplied resolver. With `only_cross_category`, links whose
    /// driven parameter lives in the driver's own category are left as-is.
    /// Unresolved ids are recorded as failures; linking continues.
    pub fn link_driven(
        &mut self,
        mut resolver: impl FnMut(ParamId) -> Option<ParamLocation>,
        only_cross_category: bool,
    ) -> Vec<LinkFailure> {
        let mut failures = Vec::new();
        for entry in &mut self.entries {
            if only_cross_category && entry.driven_category == Some(self.category) {
                continue;
            }
            match resolver(entry.link.driven_id) {
                Some(location) => entry.binding = Some(location),
                None => {
                    entry.binding = None;
                    tracing::warn!(
                        driver = self.driver_id.0,
                        driven = entry.link.driven_id.0,
                        "driven link failed to resolve"
                    );
                    failures.push(LinkFailure {
                        driver_id: self.driver_id,
                        driven_id: entry.link.driven_id,
                    });
                }
            }
        }
        failures
    }

    /// Clear all bindings, used before re-linking after wearable
    /// composition changes.
    pub fn reset_driven_links(&mut self) {
        for entry in &mut self.entries {
            entry.binding = None;
        }
    }

    /// Compute updates for every bound link given the driver's effective
    /// weight `x`, its own bounds, and its animating flag. `bounds_of`
    /// supplies each driven parameter's `(min, max)`; links it cannot
    /// answer for are skipped.
    pub fn propagate(
        &self,
        x: f32,
        driver_min: f32,
        driver_max: f32,
        is_animating: bool,
        mut bounds_of: impl FnMut(ParamId) -> Option<(f32, f32)>,
    ) -> Vec<DrivenUpdate> {
        let mut out = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let Some(location) = entry.binding else {
                continue;
            };
            let Some((dmin, dmax)) = bounds_of(entry.link.driven_id) else {
                continue;
            };
            let value = remap_driven(x, &entry.link, dmin, dmax, driver_min, driver_max, is_animating);
            out.push(DrivenUpdate {
                driven_id: entry.link.driven_id,
                location,
                value,
            });
        }
        out
    }
}

/// The 4-point remap curve. Pure so the segment properties can be tested in
/// isolation. Zero-width slope segments are guarded against divide-by-zero:
/// a collapsed down-slope (`min2 == max2`) keeps the plateau value past it,
/// which also makes a fully collapsed curve behave as a step function.
pub fn remap_driven(
    x: f32,
    link: &DrivenLinkDefinition,
    dmin: f32,
    dmax: f32,
    driver_min: f32,
    driver_max: f32,
    is_animating: bool,
) -> f32 {
    let DrivenLinkDefinition {
        min1,
        max1,
        max2,
        min2,
        ..
    } = *link;

    if x <= min1 {
        // A collapsed up-slope pinned at the driver's lower bound means the
        // step has already happened, unless the entire curve is that step.
        if min1 == max1 && min1 <= driver_min && min2 > min1 {
            return dmax;
        }
        if !is_animating && min1 == driver_min && max1 > min1 {
            let t = (x - min1) / (max1 - min1);
            return dmin + t * (dmax - dmin);
        }
        return dmin;
    }
    if x <= max1 {
        if max1 > min1 {
            let t = (x - min1) / (max1 - min1);
            return dmin + t * (dmax - dmin);
        }
        return dmax;
    }
    if x <= max2 {
        return dmax;
    }
    if x <= min2 {
        if min2 > max2 {
            let t = (x - max2) / (min2 - max2);
            return dmax + t * (dmin - dmax);
        }
        return dmax;
    }
    // Past min2.
    if min2 == max2 {
        // No descent region was defined; stay on the plateau.
        return dmax;
    }
    if is_animating && min2 == driver_max {
        let t = (x - max2) / (min2 - max2);
        return dmax + t * (dmin - dmax);
    }
    dmin
}

#[cfg(test)]
#[path = "../../tests/unit/param/driver.rs"]
mod tests;
