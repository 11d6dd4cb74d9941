use profile_scraper::pipeline::identity_key;
use profile_scraper::{CanonicalProfile, ExtractionReport, ProfileExtractor, Tier};
use std::collections::HashSet;

fn extract(html: &str) -> ExtractionReport {
    ProfileExtractor::with_defaults().unwrap().extract(html)
}

const FACULTY_TABLE: &str = r#"<html><body>
    <table>
      <tr><th>Name</th><th>Designation</th><th>Department</th><th>Email</th></tr>
      <tr><td>Dr. A. Rahman</td><td>Professor</td><td>CSE</td><td>a.rahman@x.edu</td></tr>
    </table>
</body></html>"#;

const ANCHOR_CARD: &str = r#"<html><body>
    <nav><a href="/">Home</a></nav>
    <div class="card"><a href="/people/jane">Prof. Jane Doe</a>; Designation: Lecturer; Department: Physics</div>
</body></html>"#;

const GENERIC_DIVS: &str = r#"<html><body>
    <div class="people">
      <div class="person">Dr. Karim Hossain, Associate Professor, Faculty of Science; Email: karim@uni.edu</div>
      <div class="person">Dr. Nadia Islam, Assistant Professor, Faculty of Arts; Email: nadia@uni.edu</div>
    </div>
</body></html>"#;

const MESSY_PAGE: &str = r#"<html><body>
    <header><ul><li><a href="/">Home</a></li><li><a href="/login">Login to portal</a></li></ul></header>
    <ul class="staff">
      <li><a href="/staff/1">Dr. Amina Yusuf</a><br>Designation: Senior Lecturer<br>Email: amina@x.org</li>
      <li><a href="/staff/2">Dr. Amina Yusuf</a><br>Designation: Senior Lecturer<br>Email: amina@x.org</li>
      <li><a href="/staff/3">Mr. Tomas Berg</a><br>Position: Registrar<br>Phone: +46 (0)8 555 0199</li>
    </ul>
    <table>
      <thead><tr><th>Name</th><th>Title</th><th>Unit</th></tr></thead>
      <tbody>
        <tr><td>Maria Lopez</td><td>Professor</td><td>Marine Biology</td></tr>
        <tr><td></td><td>Professor</td><td>Vacant</td></tr>
      </tbody>
    </table>
    <footer><div>Copyright 2024 the university, all rights reserved, privacy and terms apply</div></footer>
</body></html>"#;

#[test]
fn test_table_with_header_row_yields_canonical_record() {
    let report = extract(FACULTY_TABLE);
    assert_eq!(
        report.profiles,
        vec![CanonicalProfile {
            name: "Dr. A. Rahman".to_string(),
            designation: "Professor".to_string(),
            organization: "CSE".to_string(),
            email: "a.rahman@x.edu".to_string(),
            phone: String::new(),
        }]
    );
    assert_eq!(report.tier(Tier::TableRow).unwrap().accepted, 1);
    assert!(!report.no_profiles_found);
}

#[test]
fn test_anchor_block_with_explicit_keys() {
    let report = extract(ANCHOR_CARD);
    assert_eq!(report.profiles.len(), 1);
    let profile = &report.profiles[0];
    assert!(profile.name.contains("Jane Doe"));
    assert_eq!(profile.designation, "Lecturer");
    assert_eq!(profile.organization, "Physics");
    assert_eq!(report.tier(Tier::Anchor).unwrap().accepted, 1);
}

#[test]
fn test_home_link_never_becomes_a_record() {
    let report = extract(ANCHOR_CARD);
    assert!(report.profiles.iter().all(|p| !p.name.contains("Home")));

    let nav_only = extract(r#"<html><body><nav><a href="/">Home</a></nav></body></html>"#);
    assert!(nav_only.profiles.is_empty());
    assert!(nav_only.no_profiles_found);
}

#[test]
fn test_navigation_menu_never_becomes_a_record_in_fallback() {
    let html = r#"<html><body>
        <div class="menu"><ul>
          <li><a href="/">Home</a></li>
          <li><a href="/people">Our People Directory</a></li>
          <li><a href="/login">Sign in to portal</a></li>
        </ul></div>
    </body></html>"#;
    let report = extract(html);
    assert!(report.fallback_used);
    assert!(report.profiles.is_empty(), "menu produced {:?}", report.profiles);
    assert!(report.no_profiles_found);
}

#[test]
fn test_separate_cells_are_not_joined_into_a_phone() {
    let report = extract(
        r#"<table>
            <tr><th>Name</th><th>Designation</th><th>Room</th><th>Ext</th></tr>
            <tr><td>Dr. A. Rahman</td><td>Professor</td><td>305</td><td>4455</td></tr>
        </table>"#,
    );
    assert_eq!(report.profiles.len(), 1);
    assert_eq!(report.profiles[0].phone, "");
}

#[test]
fn test_year_range_is_not_taken_as_phone() {
    let report = extract(
        r#"<div><a href="/people/jane">Prof. Jane Doe</a>; Designation: Lecturer; Department: Physics; Head of unit 2010 - 2015</div>"#,
    );
    assert_eq!(report.profiles.len(), 1);
    assert_eq!(report.profiles[0].designation, "Lecturer");
    assert_eq!(report.profiles[0].phone, "");
}

#[test]
fn test_generic_containers_yield_records() {
    let report = extract(GENERIC_DIVS);
    assert!(!report.fallback_used);
    assert!(report.tier(Tier::GenericContainer).unwrap().accepted >= 1);

    let karim = report
        .profiles
        .iter()
        .find(|p| p.name == "Dr. Karim Hossain")
        .expect("record for the first person");
    assert_eq!(karim.designation, "Associate Professor");
    assert_eq!(karim.organization, "Faculty of Science");
    assert_eq!(karim.email, "karim@uni.edu");

    assert!(report.profiles.iter().any(|p| p.name == "Dr. Nadia Islam"));
}

#[test]
fn test_structureless_document_is_flagged_not_failed() {
    for html in ["", "<p>Just a paragraph.</p>", "<<<not html at all", "<div><span>x</span></div>"] {
        let report = extract(html);
        assert!(report.profiles.is_empty(), "unexpected records for {:?}", html);
        assert!(report.no_profiles_found);
        assert!(report.fallback_used);
    }
}

#[test]
fn test_duplicates_collapse_first_seen_wins() {
    let report = extract(MESSY_PAGE);
    let amina: Vec<_> = report
        .profiles
        .iter()
        .filter(|p| p.name == "Dr. Amina Yusuf")
        .collect();
    assert_eq!(amina.len(), 1);
    assert_eq!(amina[0].email, "amina@x.org");
    assert!(report.duplicates_dropped >= 1);

    let tomas = report.profiles.iter().find(|p| p.name == "Mr. Tomas Berg").unwrap();
    assert_eq!(tomas.designation, "Registrar");
    assert_eq!(tomas.phone, "+46 (0)8 555 0199");
}

#[test]
fn test_emission_order_follows_tiers() {
    let report = extract(MESSY_PAGE);
    let names: Vec<&str> = report.profiles.iter().map(|p| p.name.as_str()).collect();
    let amina = names.iter().position(|n| *n == "Dr. Amina Yusuf").unwrap();
    let maria = names.iter().position(|n| *n == "Maria Lopez").unwrap();
    assert!(amina < maria, "anchor records come before table records: {:?}", names);
}

#[test]
fn test_every_record_is_named_and_unique() {
    for html in [FACULTY_TABLE, ANCHOR_CARD, GENERIC_DIVS, MESSY_PAGE] {
        let report = extract(html);
        let mut keys = HashSet::new();
        for profile in &report.profiles {
            assert!(!profile.name.trim().is_empty());
            assert!(keys.insert(identity_key(profile)), "duplicate identity {:?}", profile);
        }
    }
}

#[test]
fn test_runs_are_idempotent() {
    let extractor = ProfileExtractor::with_defaults().unwrap();
    for html in [FACULTY_TABLE, ANCHOR_CARD, GENERIC_DIVS, MESSY_PAGE] {
        let first = extractor.extract(html);
        let second = extractor.extract(html);
        assert_eq!(first.profiles, second.profiles);
        assert_eq!(first.tiers, second.tiers);
    }
}

#[test]
fn test_extractor_shared_across_threads() {
    let extractor = std::sync::Arc::new(ProfileExtractor::with_defaults().unwrap());
    let handles: Vec<_> = [FACULTY_TABLE, GENERIC_DIVS]
        .into_iter()
        .map(|html| {
            let extractor = extractor.clone();
            std::thread::spawn(move || extractor.extract(html).profiles.len())
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap() >= 1);
    }
}
