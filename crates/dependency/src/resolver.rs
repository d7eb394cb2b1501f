//! Checkpoint computation and history lookup via [`DependencyResolver`].
//!
//! A child firing at a reference time depends on the parent run that belongs
//! to the same "governing" cycle, where the governing schedule is whichever
//! of parent/child has the coarser cycle:
//!
//! 1. Align the reference time down to the governing cycle's truncation unit
//!    and step back `cycles - 1` units (the checkpoint base).
//! 2. Place the search key on the parent schedule instant selected by a
//!    [`ScheduleOffset`] relative to that base.
//! 3. Search the parent's history with [`Lookup::Ceiling`] or
//!    [`Lookup::Higher`] from that key.
//!
//! An absent result means "not ready yet", never an error.

use chrono::{Local, NaiveDateTime, TimeZone};
use tracing::{debug, warn};

use cyclic_core::config::ResolverConfig;
use cyclic_core::{number_of_cycles, truncation_unit, Lookup, Result, ScheduleOffset};
use cyclic_schedule::CronSchedule;

use crate::history::OrderedHistory;
use crate::record::SuccessRecord;

/// Which parent instant to key on and how to search history from it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DependencyQuery {
    pub anchor: ScheduleOffset,
    pub lookup: Lookup,
}

impl DependencyQuery {
    pub fn new(anchor: ScheduleOffset, lookup: Lookup) -> Self {
        Self { anchor, lookup }
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(config.anchor, config.lookup)
    }
}

/// Search `history` from `key`.
///
/// `Ceiling` includes a record at exactly the key's time; `Higher` does not.
pub fn find_satisfying<'h, H>(
    history: &'h H,
    key: &SuccessRecord,
    lookup: Lookup,
) -> Option<&'h SuccessRecord>
where
    H: OrderedHistory + ?Sized,
{
    match lookup {
        Lookup::Ceiling => history.ceiling(key),
        Lookup::Higher => history.higher(key),
    }
}

/// Resolves single parent → child dependency edges.
///
/// Naive reference times are interpreted in the resolver's time zone, which
/// is also the zone cron fire times are computed in.
#[derive(Debug, Clone)]
pub struct DependencyResolver<Tz: TimeZone = Local> {
    tz: Tz,
}

impl DependencyResolver<Local> {
    /// Resolver working in the process's local time zone.
    pub fn new() -> Self {
        Self { tz: Local }
    }
}

impl Default for DependencyResolver<Local> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Tz: TimeZone> DependencyResolver<Tz> {
    pub fn with_timezone(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    /// The schedule with the coarser cycle. Ties go to the parent.
    pub fn governing_schedule<'s>(
        &self,
        parent: &'s CronSchedule,
        child: &'s CronSchedule,
    ) -> Result<&'s CronSchedule> {
        let parent_cycle = parent.cycle_in(&self.tz).map_err(|e| {
            warn!(cron = %parent, error = %e, "cannot classify parent schedule");
            e
        })?;
        let child_cycle = child.cycle_in(&self.tz).map_err(|e| {
            warn!(cron = %child, error = %e, "cannot classify child schedule");
            e
        })?;

        let governing = if child_cycle > parent_cycle { child } else { parent };
        debug!(
            parent = %parent,
            parent_cycle = %parent_cycle,
            child = %child,
            child_cycle = %child_cycle,
            governing = %governing,
            "chose governing schedule"
        );
        Ok(governing)
    }

    /// Lower bound of the look-back window for `reference`.
    ///
    /// `reference` truncated to the governing cycle's unit, minus
    /// `cycles - 1` of those units, where `cycles` is how many nominal cycles
    /// the governing schedule's interval spans.
    pub fn checkpoint_base(
        &self,
        reference: NaiveDateTime,
        governing: &CronSchedule,
    ) -> Result<NaiveDateTime> {
        let interval = governing.interval_in(&self.tz)?;
        let unit = truncation_unit(interval)?;
        let cycles = number_of_cycles(interval)?;

        let base = unit.step_back(unit.truncate(reference), cycles - 1)?;
        debug!(
            cron = %governing,
            %reference,
            interval_ms = interval,
            unit = ?unit,
            cycles,
            %base,
            "computed checkpoint base"
        );
        Ok(base)
    }

    /// Search key for the child's dependency on the parent at `reference`.
    ///
    /// The key's time is the parent schedule instant at `anchor` relative to
    /// the checkpoint base; it carries the child's cron and is never stored.
    pub fn checkpoint_record(
        &self,
        parent: &CronSchedule,
        child: &CronSchedule,
        reference: NaiveDateTime,
        anchor: ScheduleOffset,
    ) -> Result<SuccessRecord> {
        let governing = self.governing_schedule(parent, child)?;
        let base = self.checkpoint_base(reference, governing)?;
        let checkpoint = parent.schedule_time(&self.tz, base, anchor)?;
        debug!(
            parent = %parent,
            child = %child,
            %base,
            %anchor,
            %checkpoint,
            "built checkpoint key"
        );
        SuccessRecord::new(child.expression(), checkpoint)
    }

    /// The parent run satisfying the child's firing at `reference`, if any.
    pub fn resolve<H>(
        &self,
        parent: &CronSchedule,
        child: &CronSchedule,
        reference: NaiveDateTime,
        history: &H,
        query: DependencyQuery,
    ) -> Result<Option<SuccessRecord>>
    where
        H: OrderedHistory + ?Sized,
    {
        let key = self.checkpoint_record(parent, child, reference, query.anchor)?;
        let found = find_satisfying(history, &key, query.lookup).cloned();
        debug!(
            parent = %parent,
            child = %child,
            %reference,
            checkpoint = %key.schedule_time(),
            lookup = %query.lookup,
            satisfied_by = ?found.as_ref().map(SuccessRecord::schedule_time),
            "resolved dependency"
        );
        Ok(found)
    }

    pub fn is_satisfied<H>(
        &self,
        parent: &CronSchedule,
        child: &CronSchedule,
        reference: NaiveDateTime,
        history: &H,
        query: DependencyQuery,
    ) -> Result<bool>
    where
        H: OrderedHistory + ?Sized,
    {
        Ok(self.resolve(parent, child, reference, history, query)?.is_some())
    }
}
