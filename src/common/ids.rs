// src/common/ids.rs

use rand::Rng;
use uuid::Uuid;

/// Quantas tentativas aleatórias antes de varrer o espaço de sufixos em ordem.
const RANDOM_TENANT_ATTEMPTS: usize = 64;

/// ID genérico `<PREFIXO>-<uuid>`; único sem depender do estado da coleção.
pub fn record_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple().to_string().to_uppercase())
}

pub fn lease_id(year: i32) -> String {
    record_id(&format!("LEASE-{year}"))
}

/// ID de inquilino `TEN-<ano>-<NNN>`, sorteado e re-sorteado até não colidir.
///
/// Se o sorteio insistir em colidir (ano quase lotado), varre os sufixos em ordem;
/// acima de 999 o sufixo simplesmente ganha mais dígitos, então sempre termina.
pub fn tenant_id<R, F>(year: i32, rng: &mut R, is_taken: F) -> String
where
    R: Rng + ?Sized,
    F: Fn(&str) -> bool,
{
    for _ in 0..RANDOM_TENANT_ATTEMPTS {
        let candidate = format!("TEN-{}-{:03}", year, rng.gen_range(0..1000));
        if !is_taken(&candidate) {
            return candidate;
        }
    }

    (0u64..)
        .map(|n| format!("TEN-{}-{:03}", year, n))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or_else(|| record_id(&format!("TEN-{year}")))
}

/// Próximo número de uma sequência `<PREFIXO>-<NNN>` a partir dos IDs existentes.
/// Usa o maior sufixo visto + 1, então exclusões não fazem números se repetirem.
pub fn next_sequence<'a, I>(prefix: &str, existing: I) -> u64
where
    I: IntoIterator<Item = &'a str>,
{
    let marker = format!("{prefix}-");
    existing
        .into_iter()
        .filter_map(|id| id.strip_prefix(marker.as_str()))
        .filter_map(|suffix| suffix.parse::<u64>().ok())
        .max()
        .map_or(1, |max| max + 1)
}

pub fn sequence_id(prefix: &str, number: u64, width: usize) -> String {
    format!("{prefix}-{number:0width$}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashSet;

    #[test]
    fn tenant_ids_never_collide_with_existing() {
        let mut rng = StdRng::seed_from_u64(7);
        // Metade do espaço do ano já ocupada
        let existing: HashSet<String> = (0..500).map(|n| format!("TEN-2025-{:03}", n * 2)).collect();

        for _ in 0..10_000 {
            let id = tenant_id(2025, &mut rng, |candidate| existing.contains(candidate));
            assert!(!existing.contains(&id), "generated duplicate {id}");
            assert!(id.starts_with("TEN-2025-"));
        }
    }

    #[test]
    fn tenant_ids_terminate_when_year_is_full() {
        let mut rng = StdRng::seed_from_u64(1);
        let existing: HashSet<String> = (0..1000).map(|n| format!("TEN-2025-{:03}", n)).collect();

        let id = tenant_id(2025, &mut rng, |candidate| existing.contains(candidate));
        assert_eq!(id, "TEN-2025-1000");
    }

    #[test]
    fn sequences_continue_after_the_highest_number() {
        let ids = ["ST-001", "ST-007", "C-01", "ST-abc"];
        assert_eq!(next_sequence("ST", ids.iter().copied()), 8);
        assert_eq!(next_sequence("AR", std::iter::empty()), 1);
        assert_eq!(sequence_id("ST", 8, 3), "ST-008");
        assert_eq!(sequence_id("AR", 12, 5), "AR-00012");
    }

    #[test]
    fn record_ids_are_prefixed_and_unique() {
        let a = record_id("EXP");
        let b = record_id("EXP");
        assert!(a.starts_with("EXP-"));
        assert_ne!(a, b);
        assert!(lease_id(2025).starts_with("LEASE-2025-"));
    }
}
