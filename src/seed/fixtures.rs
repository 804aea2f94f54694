//! Demo data for `nexus_pm seed`.
//!
//! Fixtures point at each other by natural key (user email, client name,
//! project name, tag name, technology name), never by id. Dates are day
//! offsets from the day the seed runs so the dashboard always has a mix of
//! upcoming and overdue work.

use crate::models::{DeliverableStatus, ProjectStatus, ResourceKind, TaskPriority, TaskStatus, UserRole};

pub struct UserFixture {
    pub name: &'static str,
    pub email: &'static str,
    pub role: UserRole,
}

pub struct ClientFixture {
    pub name: &'static str,
    pub email: &'static str,
    pub phone: &'static str,
    pub company: Option<&'static str>,
    pub notes: Option<&'static str>,
}

pub struct ProjectFixture {
    pub name: &'static str,
    pub client: &'static str,
    pub owner: Option<&'static str>,
    pub description: &'static str,
    pub status: ProjectStatus,
    pub start_offset: i64,
    pub due_offset: Option<i64>,
    pub budget: f64,
    pub technologies: &'static [&'static str],
}

pub struct TaskFixture {
    pub project: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assignee: Option<&'static str>,
    pub due_offset: Option<i64>,
    pub estimated_hours: f64,
    pub tags: &'static [&'static str],
}

pub struct DeliverableFixture {
    pub project: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub due_offset: Option<i64>,
    pub status: DeliverableStatus,
}

pub struct ResourceFixture {
    pub project: &'static str,
    pub name: &'static str,
    pub kind: ResourceKind,
    pub url: &'static str,
}

pub struct TechnologyFixture {
    pub name: &'static str,
    pub category: &'static str,
}

pub struct TagFixture {
    pub name: &'static str,
    pub color: &'static str,
}

pub struct EventFixture {
    pub project: Option<&'static str>,
    pub title: &'static str,
    pub description: &'static str,
    pub day_offset: i64,
    /// Start hour (UTC); ignored for all-day events
    pub start_hour: u32,
    pub duration_hours: i64,
    pub all_day: bool,
}

pub struct Fixtures {
    pub users: &'static [UserFixture],
    pub clients: &'static [ClientFixture],
    pub technologies: &'static [TechnologyFixture],
    pub tags: &'static [TagFixture],
    pub projects: &'static [ProjectFixture],
    pub tasks: &'static [TaskFixture],
    pub deliverables: &'static [DeliverableFixture],
    pub resources: &'static [ResourceFixture],
    pub events: &'static [EventFixture],
    pub settings: &'static [(&'static str, &'static str)],
}

const USERS: &[UserFixture] = &[
    UserFixture { name: "Alex Rivera", email: "alex@nexuspm.dev", role: UserRole::Admin },
    UserFixture { name: "Priya Shah", email: "priya@nexuspm.dev", role: UserRole::Manager },
    UserFixture { name: "Sam Okafor", email: "sam@nexuspm.dev", role: UserRole::Member },
];

const CLIENTS: &[ClientFixture] = &[
    ClientFixture {
        name: "Acme Logistics",
        email: "ops@acme-logistics.com",
        phone: "+1 555 0100",
        company: Some("Acme Logistics Inc."),
        notes: Some("Prefers weekly status calls on Mondays."),
    },
    ClientFixture {
        name: "Bluebird Health",
        email: "it@bluebird.health",
        phone: "+1 555 0142",
        company: Some("Bluebird Health Group"),
        notes: None,
    },
    ClientFixture {
        name: "Northwind Retail",
        email: "digital@northwind.shop",
        phone: "+44 20 7946 0018",
        company: None,
        notes: Some("Invoices go to the finance mailbox."),
    },
];

const TECHNOLOGIES: &[TechnologyFixture] = &[
    TechnologyFixture { name: "Rust", category: "language" },
    TechnologyFixture { name: "TypeScript", category: "language" },
    TechnologyFixture { name: "PostgreSQL", category: "database" },
    TechnologyFixture { name: "Redis", category: "database" },
    TechnologyFixture { name: "React", category: "frontend" },
    TechnologyFixture { name: "Tailwind CSS", category: "frontend" },
    TechnologyFixture { name: "Docker", category: "infrastructure" },
    TechnologyFixture { name: "Terraform", category: "infrastructure" },
];

const TAGS: &[TagFixture] = &[
    TagFixture { name: "backend", color: "blue" },
    TagFixture { name: "frontend", color: "magenta" },
    TagFixture { name: "bug", color: "red" },
    TagFixture { name: "design", color: "yellow" },
    TagFixture { name: "devops", color: "green" },
];

const PROJECTS: &[ProjectFixture] = &[
    ProjectFixture {
        name: "Fleet Tracker",
        client: "Acme Logistics",
        owner: Some("priya@nexuspm.dev"),
        description: "Real-time vehicle tracking dashboard with route history.",
        status: ProjectStatus::Active,
        start_offset: -45,
        due_offset: Some(30),
        budget: 85_000.0,
        technologies: &["Rust", "PostgreSQL", "React", "Docker"],
    },
    ProjectFixture {
        name: "Patient Portal",
        client: "Bluebird Health",
        owner: Some("alex@nexuspm.dev"),
        description: "Appointment booking and records access for patients.",
        status: ProjectStatus::Planning,
        start_offset: 7,
        due_offset: Some(120),
        budget: 140_000.0,
        technologies: &["TypeScript", "React", "Tailwind CSS", "PostgreSQL"],
    },
    ProjectFixture {
        name: "Storefront Revamp",
        client: "Northwind Retail",
        owner: Some("priya@nexuspm.dev"),
        description: "Checkout rewrite and CDN migration for the web shop.",
        status: ProjectStatus::Active,
        start_offset: -90,
        due_offset: Some(-3),
        budget: 60_000.0,
        technologies: &["TypeScript", "Redis", "Docker", "Terraform"],
    },
];

const TASKS: &[TaskFixture] = &[
    TaskFixture {
        project: "Fleet Tracker",
        title: "Ingest GPS telemetry",
        description: "Consume the vehicle feed and store positions.",
        status: TaskStatus::Done,
        priority: TaskPriority::High,
        assignee: Some("sam@nexuspm.dev"),
        due_offset: Some(-20),
        estimated_hours: 16.0,
        tags: &["backend"],
    },
    TaskFixture {
        project: "Fleet Tracker",
        title: "Route history API",
        description: "Paginated endpoint for a vehicle's past routes.",
        status: TaskStatus::InProgress,
        priority: TaskPriority::High,
        assignee: Some("sam@nexuspm.dev"),
        due_offset: Some(5),
        estimated_hours: 12.0,
        tags: &["backend"],
    },
    TaskFixture {
        project: "Fleet Tracker",
        title: "Live map view",
        description: "Map with vehicle markers refreshed every few seconds.",
        status: TaskStatus::Todo,
        priority: TaskPriority::Medium,
        assignee: Some("priya@nexuspm.dev"),
        due_offset: Some(14),
        estimated_hours: 20.0,
        tags: &["frontend", "design"],
    },
    TaskFixture {
        project: "Fleet Tracker",
        title: "Fix stale marker positions",
        description: "Markers keep the last position after a vehicle goes offline.",
        status: TaskStatus::Review,
        priority: TaskPriority::Urgent,
        assignee: Some("sam@nexuspm.dev"),
        due_offset: Some(-1),
        estimated_hours: 3.0,
        tags: &["bug", "frontend"],
    },
    TaskFixture {
        project: "Fleet Tracker",
        title: "Container images",
        description: "Multi-stage builds for the API and worker.",
        status: TaskStatus::Done,
        priority: TaskPriority::Low,
        assignee: None,
        due_offset: None,
        estimated_hours: 4.0,
        tags: &["devops"],
    },
    TaskFixture {
        project: "Patient Portal",
        title: "Requirements workshop",
        description: "Half-day session with Bluebird stakeholders.",
        status: TaskStatus::Todo,
        priority: TaskPriority::High,
        assignee: Some("alex@nexuspm.dev"),
        due_offset: Some(9),
        estimated_hours: 6.0,
        tags: &[],
    },
    TaskFixture {
        project: "Patient Portal",
        title: "Booking flow wireframes",
        description: "Low-fidelity wireframes for appointment booking.",
        status: TaskStatus::Todo,
        priority: TaskPriority::Medium,
        assignee: Some("priya@nexuspm.dev"),
        due_offset: Some(21),
        estimated_hours: 10.0,
        tags: &["design"],
    },
    TaskFixture {
        project: "Patient Portal",
        title: "Auth provider evaluation",
        description: "Compare hosted identity providers for HIPAA fit.",
        status: TaskStatus::Todo,
        priority: TaskPriority::Low,
        assignee: None,
        due_offset: Some(30),
        estimated_hours: 8.0,
        tags: &["backend"],
    },
    TaskFixture {
        project: "Storefront Revamp",
        title: "Checkout rewrite",
        description: "Replace the legacy checkout with a single-page flow.",
        status: TaskStatus::InProgress,
        priority: TaskPriority::Urgent,
        assignee: Some("sam@nexuspm.dev"),
        due_offset: Some(-5),
        estimated_hours: 40.0,
        tags: &["frontend", "backend"],
    },
    TaskFixture {
        project: "Storefront Revamp",
        title: "Cart session cache",
        description: "Move cart sessions to Redis.",
        status: TaskStatus::Done,
        priority: TaskPriority::Medium,
        assignee: Some("sam@nexuspm.dev"),
        due_offset: Some(-30),
        estimated_hours: 12.0,
        tags: &["backend"],
    },
    TaskFixture {
        project: "Storefront Revamp",
        title: "CDN migration",
        description: "Terraform the new CDN and cut DNS over.",
        status: TaskStatus::Review,
        priority: TaskPriority::High,
        assignee: Some("alex@nexuspm.dev"),
        due_offset: Some(-2),
        estimated_hours: 14.0,
        tags: &["devops"],
    },
    TaskFixture {
        project: "Storefront Revamp",
        title: "Discount code rounding bug",
        description: "Percentage discounts round the wrong way on some totals.",
        status: TaskStatus::Todo,
        priority: TaskPriority::High,
        assignee: None,
        due_offset: Some(2),
        estimated_hours: 2.5,
        tags: &["bug"],
    },
];

const DELIVERABLES: &[DeliverableFixture] = &[
    DeliverableFixture {
        project: "Fleet Tracker",
        name: "Telemetry pipeline",
        description: "Ingestion service running in staging.",
        due_offset: Some(-15),
        status: DeliverableStatus::Accepted,
    },
    DeliverableFixture {
        project: "Fleet Tracker",
        name: "Dispatcher dashboard",
        description: "Live map and route history for dispatchers.",
        due_offset: Some(30),
        status: DeliverableStatus::InProgress,
    },
    DeliverableFixture {
        project: "Patient Portal",
        name: "Discovery report",
        description: "Findings and scope from the requirements workshop.",
        due_offset: Some(20),
        status: DeliverableStatus::Pending,
    },
    DeliverableFixture {
        project: "Patient Portal",
        name: "Clickable prototype",
        description: "Prototype of booking and records pages.",
        due_offset: Some(45),
        status: DeliverableStatus::Pending,
    },
    DeliverableFixture {
        project: "Storefront Revamp",
        name: "New checkout",
        description: "Single-page checkout live for all customers.",
        due_offset: Some(-3),
        status: DeliverableStatus::InProgress,
    },
    DeliverableFixture {
        project: "Storefront Revamp",
        name: "CDN cutover runbook",
        description: "Step-by-step DNS cutover and rollback plan.",
        due_offset: None,
        status: DeliverableStatus::Delivered,
    },
];

const RESOURCES: &[ResourceFixture] = &[
    ResourceFixture {
        project: "Fleet Tracker",
        name: "API repository",
        kind: ResourceKind::Repository,
        url: "https://git.nexuspm.dev/acme/fleet-tracker",
    },
    ResourceFixture {
        project: "Fleet Tracker",
        name: "Telemetry spec",
        kind: ResourceKind::Document,
        url: "https://docs.nexuspm.dev/acme/telemetry",
    },
    ResourceFixture {
        project: "Patient Portal",
        name: "Wireframe board",
        kind: ResourceKind::Design,
        url: "https://design.nexuspm.dev/bluebird/portal",
    },
    ResourceFixture {
        project: "Storefront Revamp",
        name: "Storefront repository",
        kind: ResourceKind::Repository,
        url: "https://git.nexuspm.dev/northwind/storefront",
    },
    ResourceFixture {
        project: "Storefront Revamp",
        name: "Staging shop",
        kind: ResourceKind::Link,
        url: "https://staging.northwind.shop",
    },
];

const EVENTS: &[EventFixture] = &[
    EventFixture {
        project: Some("Fleet Tracker"),
        title: "Fleet Tracker sprint review",
        description: "Demo route history to Acme.",
        day_offset: 2,
        start_hour: 15,
        duration_hours: 1,
        all_day: false,
    },
    EventFixture {
        project: Some("Patient Portal"),
        title: "Bluebird requirements workshop",
        description: "On site at Bluebird HQ.",
        day_offset: 9,
        start_hour: 0,
        duration_hours: 24,
        all_day: true,
    },
    EventFixture {
        project: Some("Storefront Revamp"),
        title: "CDN cutover window",
        description: "DNS switch during low traffic.",
        day_offset: 4,
        start_hour: 2,
        duration_hours: 2,
        all_day: false,
    },
    EventFixture {
        project: None,
        title: "Team retrospective",
        description: "Monthly studio retro.",
        day_offset: 12,
        start_hour: 16,
        duration_hours: 1,
        all_day: false,
    },
];

const SETTINGS: &[(&str, &str)] = &[
    (crate::models::COMPANY_NAME, "Nexus Studio"),
    (crate::models::DEFAULT_TASK_FILTER, "all"),
    ("calendar.week_start", "monday"),
    ("notifications.email_digest", "daily"),
];

pub fn default_fixtures() -> Fixtures {
    Fixtures {
        users: USERS,
        clients: CLIENTS,
        technologies: TECHNOLOGIES,
        tags: TAGS,
        projects: PROJECTS,
        tasks: TASKS,
        deliverables: DELIVERABLES,
        resources: RESOURCES,
        events: EVENTS,
        settings: SETTINGS,
    }
}
