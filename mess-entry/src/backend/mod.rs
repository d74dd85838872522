//! # Backend Module
//!
//! The backend is the single session object an operator surface talks to.
//! It owns:
//! - the configuration and the data directory connection
//! - the cached local workbook of the active day
//! - the cached mirror document of the active day (when online sync is on)
//! - one instance of each domain service
//!
//! Both caches are filled on first use and dropped when the active day
//! changes or a new day file is created.
//!
//! Every operator action is synchronous and goes through [`Backend::run_action`],
//! which turns the outcome, success or failure, into a status message and an
//! event log entry. No action failure ends the process.

use anyhow::Result;
use chrono::NaiveDate;
use log::{error, info};
use shared::{
    CheckInRequest, CheckInResponse, CouponRequest, CouponResponse, CreateDayRequest, CreateDayResponse,
    DailySummaryResponse, LogEntry, LogLevel, MirrorState, RefreshLeavesResponse, SubscriberCard, SummarySource,
    SyncSubscribersResponse,
};
use std::path::PathBuf;

pub mod domain;
pub mod storage;

use domain::commands::checkin::CheckInCommand;
use domain::commands::coupon::{CouponCommand, CouponOutcome};
use domain::commands::day::RosterCounts;
use domain::models::day::DayId;
use domain::models::leave::LeaveRecord;
use domain::models::meal::Variant;
use domain::{
    CheckInService, Clock, CouponService, DayService, EntryError, EntryResult, LeaveService, RosterService,
    StatusService, SubscriberService, SummaryService, SystemClock,
};
use storage::csv::{
    AppConfig, ConfigRepository, CsvConnection, EventLogRepository, SubscriberCacheRepository, Workbook,
};
use storage::mirror::FolderMirror;
use storage::{MirrorService, TabularStore};

const NO_DAY_FILE: &str = "No active Daily Entry File found. Please create a new one.";
const ONLINE_DISABLED: &str = "online sync is disabled";

/// Status text shown to the operator when an action succeeds
pub trait StatusMessage {
    fn status_message(&self) -> String;
}

impl StatusMessage for CheckInResponse {
    fn status_message(&self) -> String {
        self.success_message.clone()
    }
}

impl StatusMessage for CouponResponse {
    fn status_message(&self) -> String {
        self.success_message.clone()
    }
}

impl StatusMessage for CreateDayResponse {
    fn status_message(&self) -> String {
        self.success_message.clone()
    }
}

impl StatusMessage for DailySummaryResponse {
    fn status_message(&self) -> String {
        "Calculations Done!".to_string()
    }
}

impl StatusMessage for SyncSubscribersResponse {
    fn status_message(&self) -> String {
        self.success_message.clone()
    }
}

impl StatusMessage for RefreshLeavesResponse {
    fn status_message(&self) -> String {
        self.success_message.clone()
    }
}

/// What the operator sees after an action
#[derive(Debug, Clone)]
pub struct ActionReport<T> {
    /// The action's result; `None` when it failed
    pub value: Option<T>,
    /// The status line, as recorded in the event log
    pub status: LogEntry,
    /// Subscriber card attached to a check-in rejection
    pub card: Option<SubscriberCard>,
}

fn no_day_file() -> EntryError {
    EntryError::NotFound(NO_DAY_FILE.to_string())
}

fn coupon_response(outcome: CouponOutcome) -> CouponResponse {
    let success_message = format!("Coupon Generated for {}.", outcome.record.identifier);
    CouponResponse {
        identifier: outcome.record.identifier,
        meal: outcome.meal,
        amount: outcome.record.amount,
        time: outcome.record.time,
        coupons_sold: outcome.coupons_sold,
        mirrored: outcome.mirrored,
        success_message,
    }
}

/// Main backend struct that orchestrates all services
pub struct Backend<M: MirrorService = FolderMirror, C: Clock = SystemClock> {
    connection: CsvConnection,
    config: AppConfig,
    clock: C,
    mirror: Option<M>,
    online: bool,
    day_date: Option<NaiveDate>,
    session_day: Option<String>,
    workbook: Option<Workbook>,
    document: Option<M::Document>,
    status: StatusService,
    roster_service: RosterService,
    leave_service: LeaveService,
    checkin_service: CheckInService,
    coupon_service: CouponService,
    summary_service: SummaryService,
    subscriber_service: SubscriberService,
    day_service: DayService,
}

impl Backend<FolderMirror, SystemClock> {
    /// Open the station's data directory (the default one when `None`),
    /// loading or creating its configuration
    pub fn open(data_directory: Option<PathBuf>) -> Result<Self> {
        let connection = match data_directory {
            Some(directory) => CsvConnection::new(directory)?,
            None => CsvConnection::new_default()?,
        };
        let loaded = ConfigRepository::new(connection.clone()).load_or_create()?;
        let mirror = loaded.config.mirror_directory.as_ref().map(FolderMirror::new);

        let mut backend = Self::with_parts(connection, loaded.config, mirror, SystemClock);
        for warning in &loaded.warnings {
            backend.report(&warning.message, warning.level);
        }
        Ok(backend)
    }
}

impl<M: MirrorService, C: Clock> Backend<M, C> {
    /// Create a backend from already-resolved parts
    pub fn with_parts(connection: CsvConnection, config: AppConfig, mirror: Option<M>, clock: C) -> Self {
        let status = StatusService::new(EventLogRepository::new(connection.clone()));
        let subscriber_service = SubscriberService::new(
            config.sources.clone(),
            SubscriberCacheRepository::new(connection.clone()),
        );

        info!(
            "Backend ready for facility {} at {} (online sync {})",
            config.facility_id,
            connection.base_directory().display(),
            if mirror.is_some() { "on" } else { "off" }
        );

        Self {
            leave_service: LeaveService::new(config.sources.clone()),
            checkin_service: CheckInService::new(config.batch_prefixes.clone(), config.batch_suffix_width),
            day_service: DayService::new(config.share_recipients.clone()),
            roster_service: RosterService::new(),
            coupon_service: CouponService::new(),
            summary_service: SummaryService::new(),
            subscriber_service,
            status,
            connection,
            config,
            clock,
            online: mirror.is_some(),
            mirror,
            day_date: None,
            session_day: None,
            workbook: None,
            document: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Work on a specific day instead of the clock's default
    pub fn set_day_date(&mut self, date: NaiveDate) {
        self.day_date = Some(date);
    }

    /// Turn online sync on or off for this session. Has no effect without a mirror.
    pub fn set_online(&mut self, online: bool) {
        self.online = online && self.mirror.is_some();
        if !self.online {
            self.document = None;
        }
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Identifier of the active day
    pub fn day_id(&self) -> DayId {
        let date = self
            .day_date
            .unwrap_or_else(|| DayId::default_date(self.clock.now()));
        DayId::new(date, &self.config.file_label)
    }

    /// The active day's event log
    pub fn status_entries(&self) -> Result<Vec<LogEntry>> {
        self.status.entries(&self.day_id().to_string())
    }

    /// Run an action and report its outcome to the operator
    pub fn run_action<T, F>(&mut self, action: F) -> ActionReport<T>
    where
        T: StatusMessage,
        F: FnOnce(&mut Self) -> EntryResult<T>,
    {
        match action(self) {
            Ok(value) => {
                let status = self.report(&value.status_message(), LogLevel::Info);
                ActionReport {
                    value: Some(value),
                    status,
                    card: None,
                }
            }
            Err(e) => {
                if let EntryError::Unexpected(inner) = &e {
                    error!("Unexpected failure: {:?}", inner);
                }
                let card = match &e {
                    EntryError::Rejected(rejection) => rejection.card().cloned(),
                    _ => None,
                };
                let status = self.report(&e.to_string(), e.level());
                ActionReport {
                    value: None,
                    status,
                    card,
                }
            }
        }
    }

    /// Record a status line in the event log, and on the mirror for errors
    pub fn report(&mut self, message: &str, level: LogLevel) -> LogEntry {
        let day_id = self.day_id().to_string();
        let entry = self.status.record(&day_id, &self.clock.time_of_day(), message, level);
        if let Some(document) = self.document.as_mut() {
            self.status.mirror_entry(document, &entry);
        }
        entry
    }

    fn report_warnings(&mut self, warnings: &[String]) {
        for warning in warnings {
            self.report(warning, LogLevel::Warning);
        }
    }

    fn active_mirror(&self) -> EntryResult<&M> {
        if !self.online {
            return Err(EntryError::Connectivity(ONLINE_DISABLED.to_string()));
        }
        self.mirror
            .as_ref()
            .ok_or_else(|| EntryError::Connectivity(ONLINE_DISABLED.to_string()))
    }

    /// Drop cached handles when the active day changed
    fn enter_day(&mut self, day_id: &str) {
        if self.session_day.as_deref() != Some(day_id) {
            self.session_day = Some(day_id.to_string());
            self.workbook = None;
            self.document = None;
        }
    }

    /// Make sure the active day's workbook is loaded and try to connect its
    /// mirror document. Returns warnings about the mirror.
    fn prepare_stores(&mut self) -> EntryResult<Vec<String>> {
        let day_id = self.day_id().to_string();
        self.enter_day(&day_id);

        if self.workbook.is_none() {
            let workbook = Workbook::load(self.connection.day_workbook_path(&day_id)).map_err(|e| {
                if e.is_not_found() {
                    no_day_file()
                } else {
                    EntryError::from(e)
                }
            })?;
            self.workbook = Some(workbook);
        }

        let mut warnings = Vec::new();
        if self.document.is_none() && self.online {
            if let Some(mirror) = self.mirror.as_ref() {
                match mirror.open(&day_id) {
                    Ok(document) => self.document = Some(document),
                    Err(e) => warnings.push(format!("Online sheet unavailable: {}", e)),
                }
            }
        }
        Ok(warnings)
    }

    /// Check a subscriber in for a meal
    pub fn check_in(&mut self, request: &CheckInRequest) -> EntryResult<CheckInResponse> {
        let registration_number = self.checkin_service.resolve_registration(&request.registration)?;
        let command = CheckInCommand {
            registration_number,
            meal: request.meal.unwrap_or_else(|| self.clock.current_meal()),
            variant: Variant::from_toggle(request.non_veg),
            surcharge: request
                .surcharge
                .clone()
                .unwrap_or_else(|| self.config.non_veg_surcharge.clone()),
        };
        let time = self.clock.time_of_day();

        let warnings = self.prepare_stores()?;
        self.report_warnings(&warnings);

        let workbook = self.workbook.as_mut().ok_or_else(no_day_file)?;
        let outcome = self
            .checkin_service
            .check_in(workbook, self.document.as_mut(), &command, &time)?;
        self.report_warnings(&outcome.warnings);

        let success_message = format!(
            "{}: {} is checked.",
            outcome.card.registration_number, outcome.card.name
        );
        Ok(CheckInResponse {
            card: outcome.card,
            meal: outcome.meal,
            variant: outcome.variant.as_str().to_string(),
            time: outcome.time,
            coupon: outcome.coupon.map(coupon_response),
            mirrored: outcome.mirrored,
            success_message,
        })
    }

    /// Record a walk-in coupon sale
    pub fn generate_coupon(&mut self, request: &CouponRequest) -> EntryResult<CouponResponse> {
        let command = CouponCommand {
            identifier: request.identifier.clone(),
            price: request.price.clone(),
            meal: request.meal.unwrap_or_else(|| self.clock.current_meal()),
        };
        let time = self.clock.time_of_day();

        let warnings = self.prepare_stores()?;
        self.report_warnings(&warnings);

        let workbook = self.workbook.as_mut().ok_or_else(no_day_file)?;
        let outcome = self
            .coupon_service
            .record(workbook, self.document.as_mut(), &command, &time)?;
        self.report_warnings(&outcome.warnings);

        Ok(coupon_response(outcome))
    }

    /// Summarise the day, preferring the mirror and falling back to the local workbook
    pub fn calculate(&mut self) -> EntryResult<DailySummaryResponse> {
        let warnings = self.prepare_stores()?;
        self.report_warnings(&warnings);

        let mut fallback_reason = None;
        if let Some(document) = self.document.as_mut() {
            let summarised = self.summary_service.tally(&*document).and_then(|meals| {
                let lines = self.summary_service.render_lines(&meals);
                self.summary_service.write_report(document, &lines)?;
                Ok((meals, lines))
            });
            match summarised {
                Ok((meals, lines)) => {
                    return Ok(DailySummaryResponse {
                        source: SummarySource::Mirror,
                        meals,
                        report: lines.join("\n"),
                    })
                }
                Err(e) => fallback_reason = Some(e.to_string()),
            }
        }
        if let Some(reason) = fallback_reason {
            self.report(
                &format!("Online sheet not available ({}), using local file instead.", reason),
                LogLevel::Warning,
            );
        }

        let workbook = self.workbook.as_mut().ok_or_else(no_day_file)?;
        let meals = self.summary_service.tally(workbook)?;
        let lines = self.summary_service.render_lines(&meals);
        self.summary_service.write_report(workbook, &lines)?;

        Ok(DailySummaryResponse {
            source: SummarySource::Local,
            meals,
            report: lines.join("\n"),
        })
    }

    /// Rebuild the subscriber cache from the form spreadsheets
    pub fn sync_subscribers(&mut self) -> EntryResult<SyncSubscribersResponse> {
        let mirror = self.active_mirror()?;
        let subscribers = self.subscriber_service.sync(mirror)?;
        Ok(SyncSubscribersResponse {
            subscriber_count: subscribers.len(),
            success_message: format!("Subscriber Data Updated! {} subscribers.", subscribers.len()),
        })
    }

    /// Refresh the current-leave sheet for the planning day
    pub fn refresh_leaves(&mut self) -> EntryResult<RefreshLeavesResponse> {
        let mirror = self.active_mirror()?;
        let mut document = mirror.open(&self.config.sources.leave_document)?;
        let active_leaves = self
            .leave_service
            .refresh_current_leaves(&mut document, self.clock.planning_day())?;
        Ok(RefreshLeavesResponse {
            active_leaves,
            success_message: format!("Leave Data Updated! {} active leaves.", active_leaves),
        })
    }

    fn current_leaves(&self) -> EntryResult<Vec<LeaveRecord>> {
        let mirror = self.active_mirror()?;
        let document = mirror.open(&self.config.sources.leave_document)?;
        Ok(self.leave_service.read_current_leaves(&document)?)
    }

    /// Run an optional sync step of day creation; offline is a warning, anything else fails
    fn optional_step<T>(&mut self, label: &str, result: EntryResult<T>) -> EntryResult<()> {
        match result {
            Ok(_) => Ok(()),
            Err(EntryError::Connectivity(reason)) => {
                self.report(&format!("{} skipped: {}", label, reason), LogLevel::Warning);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Create the active day's file.
    ///
    /// The steps:
    /// 1. Refuse if the day's local file exists; otherwise start a fresh event log
    /// 2. Optionally refresh leaves and subscribers (skipped offline)
    /// 3. Build the roster from the subscriber cache and overlay the current leaves
    /// 4. Lay out the local workbook
    /// 5. Publish (or reuse) the mirror document
    /// 6. Save the workbook and report the counts
    pub fn create_day(&mut self, request: &CreateDayRequest) -> EntryResult<CreateDayResponse> {
        let day_id = self.day_id().to_string();
        let path = self.connection.day_workbook_path(&day_id);
        if Workbook::exists(&path) {
            return Err(EntryError::Invalid(format!("{} file already exists!", day_id)));
        }

        self.session_day = Some(day_id.clone());
        self.workbook = None;
        self.document = None;
        self.status.reset(&day_id)?;

        if request.update_leaves {
            self.report("Updating Leave Data", LogLevel::Info);
            let refreshed = self.refresh_leaves();
            self.optional_step("Leave update", refreshed)?;
        }
        if request.update_subscribers {
            self.report("Updating Subscriber Data", LogLevel::Info);
            let synced = self.sync_subscribers();
            self.optional_step("Subscriber update", synced)?;
        }

        let subscribers = self.subscriber_service.cached()?;
        let mut roster = self.roster_service.build_roster(&subscribers);
        let mut counts = RosterCounts {
            subscribers: self.roster_service.subscriber_counts(&roster),
            ..RosterCounts::default()
        };

        let mut warnings = Vec::new();
        if request.update_leaves {
            match self.current_leaves() {
                Ok(leaves) if leaves.is_empty() => {
                    self.report("No leaves found.", LogLevel::Info);
                }
                Ok(leaves) => {
                    counts.leaves = self
                        .leave_service
                        .merge_leaves(&mut roster, &leaves, self.clock.planning_day());
                }
                Err(e @ (EntryError::Connectivity(_) | EntryError::NotFound(_))) => {
                    warnings.push(format!("Leaves not applied: {}", e));
                }
                Err(e) => return Err(e),
            }
        } else {
            warnings.push("Warning! Leave Update is not enabled. Skipping updating leaves".to_string());
        }

        let mut workbook = self.roster_service.new_workbook(&path, &roster)?;

        let mut mirror_state = MirrorState::Skipped;
        if request.create_mirror {
            match self.active_mirror() {
                Ok(mirror) => {
                    let extra_recipients = match self.subscriber_service.read_repository_details(mirror) {
                        Ok(details) => details.share_emails,
                        Err(e) => {
                            warnings.push(format!("Repository recipients unavailable: {}", e));
                            Vec::new()
                        }
                    };
                    match self
                        .day_service
                        .publish_mirror(mirror, &day_id, &workbook, &extra_recipients)
                    {
                        Ok(published) => {
                            self.document = Some(published.document);
                            mirror_state = published.state;
                            warnings.extend(published.warnings);
                        }
                        Err(e) => warnings.push(format!("Online sheet not created: {}", e)),
                    }
                }
                Err(e) => warnings.push(format!("Online sheet not created: {}", e)),
            }
        }

        workbook.flush()?;
        self.workbook = Some(workbook);

        self.report_warnings(&warnings);
        match mirror_state {
            MirrorState::Created => {
                self.report("Online Sheet Created!", LogLevel::Info);
            }
            MirrorState::Reused => {
                self.report("Online sheet already exists. Using existing sheet.", LogLevel::Info);
            }
            MirrorState::Skipped => {}
        }

        let report = self.day_service.render_report(&counts);
        info!("Created day {} with {} subscribers", day_id, roster.len());
        Ok(CreateDayResponse {
            day_id,
            subscribers: counts.subscribers,
            leaves: counts.leaves,
            mirror: mirror_state,
            report,
            success_message: "File Created!".to_string(),
        })
    }
}
