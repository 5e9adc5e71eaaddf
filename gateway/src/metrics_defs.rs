//! Metrics definitions for the gateway.

use shared::metrics_defs::{MetricDef, MetricType};

pub const MENU_CACHE_HIT: MetricDef = MetricDef {
    name: "menu_cache.hit",
    metric_type: MetricType::Counter,
    description: "Number of lookups served from the menu artifact cache",
};

pub const MENU_CACHE_MISS: MetricDef = MetricDef {
    name: "menu_cache.miss",
    metric_type: MetricType::Counter,
    description: "Number of lookups that missed the menu artifact cache",
};

pub const MENU_CACHE_INVALIDATION: MetricDef = MetricDef {
    name: "menu_cache.invalidation",
    metric_type: MetricType::Counter,
    description: "Number of tag invalidations requested by tenants",
};

pub const PUSH_DISPATCH: MetricDef = MetricDef {
    name: "push.dispatch",
    metric_type: MetricType::Counter,
    description: "Number of push dispatch calls handed to the provider",
};

pub const OPERATOR_ALERT: MetricDef = MetricDef {
    name: "alerts.sent",
    metric_type: MetricType::Counter,
    description: "Number of operator alert messages attempted",
};

pub const ALL_METRICS: &[MetricDef] = &[
    MENU_CACHE_HIT,
    MENU_CACHE_MISS,
    MENU_CACHE_INVALIDATION,
    PUSH_DISPATCH,
    OPERATOR_ALERT,
];
