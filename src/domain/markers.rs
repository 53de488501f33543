// Marker reconciliation - keeps map markers in sync with the reported device set
use std::collections::{HashMap, HashSet};

use super::device::{marker_color, Device, DeviceType};

/// Everything a rendering backend needs to draw one device marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub device_id: String,
    pub device_type: String,
    pub category: DeviceType,
    pub lat: f64,
    pub lon: f64,
    pub color: &'static str,
    pub popup: String,
}

/// Rendering backend the registry drives. Handles are owned by the registry
/// between polls and handed back for updates and removal.
pub trait MarkerSurface {
    type Handle;

    fn add_marker(&mut self, spec: &MarkerSpec) -> Self::Handle;
    fn update_marker(&mut self, handle: &mut Self::Handle, spec: &MarkerSpec);
    fn remove_marker(&mut self, handle: Self::Handle);
}

#[derive(Debug)]
pub struct MarkerEntry<H> {
    pub handle: H,
    pub position: (f64, f64),
    pub popup: String,
    pub category: DeviceType,
}

/// One poll cycle: the devices reported per category. A category whose fetch
/// failed contributes no devices.
#[derive(Debug, Clone, Default)]
pub struct DevicePoll {
    pub reports: Vec<(DeviceType, Vec<Device>)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan {
    pub to_add: Vec<MarkerSpec>,
    pub to_update: Vec<MarkerSpec>,
    pub to_remove: Vec<String>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_update.is_empty() && self.to_remove.is_empty()
    }
}

#[derive(Debug)]
pub struct MarkerRegistry<H> {
    entries: HashMap<String, MarkerEntry<H>>,
}

impl<H> Default for MarkerRegistry<H> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<H> MarkerRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, device_id: &str) -> Option<&MarkerEntry<H>> {
        self.entries.get(device_id)
    }

    pub fn contains(&self, device_id: &str) -> bool {
        self.entries.contains_key(device_id)
    }

    pub fn device_ids(&self) -> HashSet<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn apply<S>(&mut self, plan: ReconcilePlan, surface: &mut S)
    where
        S: MarkerSurface<Handle = H>,
    {
        for device_id in plan.to_remove {
            if let Some(entry) = self.entries.remove(&device_id) {
                surface.remove_marker(entry.handle);
            }
        }

        for spec in plan.to_update {
            match self.entries.get_mut(&spec.device_id) {
                Some(entry) => {
                    surface.update_marker(&mut entry.handle, &spec);
                    entry.position = (spec.lat, spec.lon);
                    entry.popup = spec.popup;
                    entry.category = spec.category;
                }
                None => self.insert(spec, surface),
            }
        }

        for spec in plan.to_add {
            self.insert(spec, surface);
        }
    }

    /// Reconcile and apply in one step.
    pub fn sync<S>(&mut self, poll: &DevicePoll, surface: &mut S) -> ReconcilePlan
    where
        S: MarkerSurface<Handle = H>,
    {
        let plan = reconcile(self, poll);
        self.apply(plan.clone(), surface);
        plan
    }

    fn insert<S>(&mut self, spec: MarkerSpec, surface: &mut S)
    where
        S: MarkerSurface<Handle = H>,
    {
        let handle = surface.add_marker(&spec);
        self.entries.insert(
            spec.device_id.clone(),
            MarkerEntry {
                handle,
                position: (spec.lat, spec.lon),
                popup: spec.popup,
                category: spec.category,
            },
        );
    }
}

/// Diff the registry against one poll.
///
/// Devices with unparsable coordinates are ignored. Registered markers not
/// seen in this poll are removed, whatever their category.
pub fn reconcile<H>(registry: &MarkerRegistry<H>, poll: &DevicePoll) -> ReconcilePlan {
    let mut seen: Vec<MarkerSpec> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (category, devices) in &poll.reports {
        for device in devices {
            if device.device_id.is_empty() {
                tracing::debug!("Skipping {:?} device without an id", category);
                continue;
            }
            let Some((lat, lon)) = device.coordinates() else {
                tracing::debug!(
                    "Skipping device {} with coordinates ({}, {})",
                    device.device_id,
                    device.gps_lat,
                    device.gps_lon
                );
                continue;
            };

            let spec = MarkerSpec {
                device_id: device.device_id.clone(),
                device_type: device.device_type.clone(),
                category: *category,
                lat,
                lon,
                color: marker_color(&device.device_type),
                popup: device.popup(),
            };

            // a device reported twice in one poll keeps its last report
            match index.get(&device.device_id) {
                Some(&i) => seen[i] = spec,
                None => {
                    index.insert(device.device_id.clone(), seen.len());
                    seen.push(spec);
                }
            }
        }
    }

    let mut plan = ReconcilePlan::default();
    for spec in seen {
        if registry.contains(&spec.device_id) {
            plan.to_update.push(spec);
        } else {
            plan.to_add.push(spec);
        }
    }

    let mut to_remove: Vec<String> = registry
        .entries
        .iter()
        .filter(|(id, _)| !index.contains_key(id.as_str()))
        .map(|(id, _)| id.clone())
        .collect();
    to_remove.sort();
    plan.to_remove = to_remove;

    plan
}
