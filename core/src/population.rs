//! Synthetic directory generation.
//!
//! `plan` is pure and deterministic for a given (config, seed).
//! `populate` pushes a plan through the public service, so every
//! generated link passes the same validation as an operator's request.

use crate::{
    config::DirectoryConfig,
    context::RequestContext,
    error::DirectoryResult,
    level::{Level, LevelPolicy},
    name_generator::NameGenerator,
    record::NewRecord,
    rng::{DirectoryRng, RngStream},
    service::DirectoryService,
    types::RecordId,
};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct PopulationPlan {
    pub records: Vec<NewRecord>,
    /// (subordinate, supervisor) pairs, applied in order.
    pub links: Vec<(RecordId, RecordId)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulationSummary {
    pub provisioned: usize,
    pub assigned: usize,
}

pub fn plan(config: &DirectoryConfig, seed: u64) -> PopulationPlan {
    let mut names = DirectoryRng::new(seed, RngStream::Names);
    let mut placement = DirectoryRng::new(seed, RngStream::Placement);
    let mut supervision = DirectoryRng::new(seed, RngStream::Supervision);
    let pop = &config.population;

    let mut records = Vec::with_capacity(pop.total());
    let mut by_level: BTreeMap<Level, Vec<RecordId>> = BTreeMap::new();
    let mut serial = 0usize;

    let mut next_record = |level: Option<Level>, names: &mut DirectoryRng, placement: &mut DirectoryRng| {
        serial += 1;
        let name = NameGenerator::generate_full_name(names);
        let email = NameGenerator::email_for(&name, serial, &pop.email_domain);
        let mut rec = NewRecord::new(name, email, level).with_id(format!("p-{serial:05}"));
        if let Some(dept) = placement.pick(&config.departments) {
            rec = rec.in_department(dept.id.clone());
            if let Some(pos) = placement.pick(&dept.positions) {
                rec = rec.at_position(pos.id.clone());
            }
        }
        rec
    };

    for level in Level::ALL {
        let count = pop.headcount.get(&level).copied().unwrap_or(0);
        for _ in 0..count {
            let rec = next_record(Some(level), &mut names, &mut placement);
            by_level.entry(level).or_default().push(rec.id.clone().unwrap_or_default());
            records.push(rec);
        }
    }
    for _ in 0..pop.unassigned {
        records.push(next_record(None, &mut names, &mut placement));
    }

    let mut links = Vec::new();
    for rec in &records {
        let (Some(level), Some(id)) = (rec.level, rec.id.as_ref()) else {
            continue;
        };
        let Some(above) = LevelPolicy::eligible_level_for(level) else {
            continue;
        };
        if !supervision.chance(pop.supervised_share) {
            continue;
        }
        let candidates = by_level.get(&above).map(Vec::as_slice).unwrap_or(&[]);
        if let Some(sup) = supervision.pick(candidates) {
            links.push((id.clone(), sup.clone()));
        }
    }

    PopulationPlan { records, links }
}

/// Provision departments, records, and links from a plan into `service`.
pub fn populate(
    service: &DirectoryService,
    config: &DirectoryConfig,
    seed: u64,
    ctx: &RequestContext,
) -> DirectoryResult<PopulationSummary> {
    if service.departments()?.is_empty() {
        service.seed_departments(config)?;
    } else {
        log::info!("departments already present; skipping department seed");
    }
    let plan = plan(config, seed);

    let mut provisioned = 0usize;
    for rec in plan.records {
        service.provision(rec, ctx)?;
        provisioned += 1;
    }
    let mut assigned = 0usize;
    for (source, target) in &plan.links {
        service.assign_supervisor(source, target, ctx)?;
        assigned += 1;
    }
    log::info!("populated directory: {provisioned} records, {assigned} supervisor links (seed {seed})");
    Ok(PopulationSummary {
        provisioned,
        assigned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_is_deterministic() {
        let config = DirectoryConfig::default_test();
        let a = plan(&config, 1234);
        let b = plan(&config, 1234);
        let names_a: Vec<_> = a.records.iter().map(|r| r.name.clone()).collect();
        let names_b: Vec<_> = b.records.iter().map(|r| r.name.clone()).collect();
        assert_eq!(names_a, names_b);
        assert_eq!(a.links, b.links);
    }

    #[test]
    fn plan_respects_headcount() {
        let config = DirectoryConfig::default_test();
        let p = plan(&config, 5);
        assert_eq!(p.records.len(), config.population.total());
        let level1 = p.records.iter().filter(|r| r.level == Some(Level::Level1)).count();
        assert_eq!(level1, 1);
        let unassigned = p.records.iter().filter(|r| r.level.is_none()).count();
        assert_eq!(unassigned, 3);
    }

    #[test]
    fn full_supervision_links_every_non_root_record() {
        let config = DirectoryConfig::default_test();
        let p = plan(&config, 77);
        let non_root = p
            .records
            .iter()
            .filter(|r| matches!(r.level, Some(l) if l != Level::Level1))
            .count();
        assert_eq!(p.links.len(), non_root);
    }
}
