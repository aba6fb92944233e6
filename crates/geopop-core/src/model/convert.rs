// crates/geopop-core/src/model/convert.rs
use super::domain::{Municipality, MunicipalityRef, Province, Region};
use std::collections::BTreeMap;

/// Sum of the present values; missing values are skipped, an all-missing
/// input sums to zero.
pub(crate) fn sum_present<I: IntoIterator<Item = Option<f64>>>(values: I) -> f64 {
    values.into_iter().flatten().sum()
}

/// **Rollup:** Municipalities -> Provinces -> Regions.
///
/// Provinces are grouped by `(province_code, province, province_short)` and
/// come out sorted by that key. Each keeps the first non-missing region
/// fields of its municipalities, the population sums (missing values
/// ignored) and the `{code, name}` list of its municipalities in input
/// order. Regions are grouped by region code from the provinces, nesting
/// each province summary. Provinces without a region code do not reach any
/// region.
pub fn rollup_administrative(municipalities: &[Municipality]) -> (Vec<Province>, Vec<Region>) {
    let mut groups: BTreeMap<(u32, &str, &str), Vec<&Municipality>> = BTreeMap::new();
    for m in municipalities {
        groups
            .entry((m.province_code, m.province.as_str(), m.province_short.as_str()))
            .or_default()
            .push(m);
    }

    let provinces: Vec<Province> = groups
        .into_iter()
        .map(|((code, name, short), members)| Province {
            province_code: code,
            province: name.to_owned(),
            province_short: short.to_owned(),
            region_code: members.iter().find_map(|m| m.region_code),
            region: members.iter().find_map(|m| m.region.clone()),
            municipalities: members
                .iter()
                .map(|m| MunicipalityRef {
                    municipality_code: m.municipality_code,
                    municipality: m.municipality.clone(),
                })
                .collect(),
            population: sum_present(members.iter().map(|m| m.population)),
            population_f: sum_present(members.iter().map(|m| m.population_f)),
            population_m: sum_present(members.iter().map(|m| m.population_m)),
        })
        .collect();

    let regions = rollup_regions(&provinces);
    (provinces, regions)
}

fn rollup_regions(provinces: &[Province]) -> Vec<Region> {
    let mut groups: BTreeMap<u32, Vec<&Province>> = BTreeMap::new();
    for p in provinces {
        if let Some(code) = p.region_code {
            groups.entry(code).or_default().push(p);
        }
    }

    groups
        .into_iter()
        .filter_map(|(code, members)| {
            let name = members.iter().find_map(|p| p.region.clone())?;
            Some(Region {
                region_code: code,
                region: name,
                provinces: members.iter().map(|p| p.summary()).collect(),
                population: members.iter().map(|p| p.population).sum(),
                population_f: members.iter().map(|p| p.population_f).sum(),
                population_m: members.iter().map(|p| p.population_m).sum(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn municipality(
        code: u32,
        name: &str,
        province: (u32, &str, &str),
        pop: [Option<f64>; 3],
    ) -> Municipality {
        Municipality {
            municipality_code: code,
            municipality: name.into(),
            cadastral_code: format!("X{:03}", code % 1000),
            province_code: province.0,
            province: province.1.into(),
            province_short: province.2.into(),
            region_code: Some(1),
            region: Some("Piemonte".into()),
            population: pop[0],
            population_f: pop[1],
            population_m: pop[2],
        }
    }

    #[test]
    fn provinces_keep_member_order_and_skip_missing_values() {
        let torino = (1, "Torino", "TO");
        let rows = vec![
            municipality(1002, "Airasca", torino, [Some(10.0), None, Some(4.0)]),
            municipality(1001, "Agliè", torino, [Some(5.0), Some(3.0), Some(2.0)]),
        ];
        let (provinces, regions) = rollup_administrative(&rows);

        assert_eq!(provinces.len(), 1);
        let p = &provinces[0];
        let codes: Vec<u32> = p.municipalities.iter().map(|m| m.municipality_code).collect();
        assert_eq!(codes, vec![1002, 1001]);
        assert_eq!(p.population, 15.0);
        assert_eq!(p.population_f, 3.0);
        assert_eq!(p.population_m, 6.0);

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].provinces[0].municipalities.len(), 2);
        assert_eq!(regions[0].population, 15.0);
    }

    #[test]
    fn provinces_are_sorted_by_code() {
        let rows = vec![
            municipality(5001, "Agliano Terme", (5, "Asti", "AT"), [None; 3]),
            municipality(1001, "Agliè", (1, "Torino", "TO"), [None; 3]),
        ];
        let (provinces, _) = rollup_administrative(&rows);
        let codes: Vec<u32> = provinces.iter().map(|p| p.province_code).collect();
        assert_eq!(codes, vec![1, 5]);
        assert_eq!(provinces[0].population, 0.0);
    }
}
