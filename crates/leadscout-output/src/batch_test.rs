use chrono::TimeZone;

use super::*;

fn started_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 14, 9, 30, 0).unwrap()
}

fn scored(name: &str, score: u8, tier: Tier) -> ScoredLead {
    ScoredLead {
        lead: RawLead {
            name: name.to_string(),
            website: Some(format!("https://{}.example", name.to_lowercase())),
            phone: Some("(303) 455-4865".to_string()),
            locality: "Denver, CO".to_string(),
            industry: "daycare".to_string(),
            details_error: None,
        },
        audit: AuditSignals {
            page_load_seconds: Some(8.54),
            performance_score: Some(31),
            markup: Some(MarkupChecks {
                has_faq_markup: true,
                ..MarkupChecks::default()
            }),
            content_freshness_months: Some(18),
            traffic_trend_90d: Some(-12.5),
            detected_tech_stack: Some("WordPress".to_string()),
            issues: vec![
                "slow LCP, 8.5s".to_string(),
                "no structured data".to_string(),
            ],
            degraded: false,
        },
        score,
        tier,
    }
}

fn analysed(name: &str) -> LeadRecord {
    LeadRecord::WithDeepAnalysis {
        lead: scored(name, 95, Tier::Hot),
        analysis: DeepAnalysis {
            seo_score: Some(45),
            critical_issues: vec!["8.5 second page load time on mobile".to_string()],
            revenue_impact: Some("$5,000-8,000/month".to_string()),
            services_offered: vec!["Infant care".to_string(), "Preschool".to_string()],
            cta_quality: Some("Weak".to_string()),
            pitch_angle: Some("Parents won't wait 8 seconds, \"really\".".to_string()),
            ..DeepAnalysis::default()
        },
    }
}

#[test]
fn batch_reads_back_what_was_written() {
    let dir = tempfile::tempdir().unwrap();
    let sink = BatchSink::new(dir.path());

    let offline = ScoredLead {
        lead: RawLead {
            name: "Offline".to_string(),
            website: None,
            phone: None,
            locality: "Denver, CO".to_string(),
            industry: "daycare".to_string(),
            details_error: None,
        },
        audit: AuditSignals::no_website(),
        score: 0,
        tier: Tier::Cold,
    };
    let records = vec![
        LeadRecord::Base(offline),
        analysed("Learning"),
        LeadRecord::Base(scored("Kiddos", 52, Tier::Warm)),
    ];

    let path = sink.write(&records, Uuid::new_v4(), started_at()).unwrap();
    assert!(path.ends_with("leads_20261014_093000.csv"));

    let read = read_batch(&path).unwrap();
    assert_eq!(read.len(), 3);
    // Rows are stored in report order.
    assert_eq!(read[0], records[1]);
    assert_eq!(read[1], records[2]);
    assert_eq!(read[2], records[0]);
}

#[test]
fn blank_text_values_round_trip_once_normalized() {
    let dir = tempfile::tempdir().unwrap();
    let mut lead = scored("Blanks", 90, Tier::Hot);
    lead.lead.phone = Some(String::new());
    lead.lead = lead.lead.normalized();
    let record = LeadRecord::WithDeepAnalysis {
        lead,
        analysis: DeepAnalysis {
            revenue_impact: Some(String::new()),
            unique_selling_proposition: Some("   ".to_string()),
            critical_issues: vec![String::new()],
            pitch_angle: Some("Lead with the slow page".to_string()),
            ..DeepAnalysis::default()
        }
        .normalized(),
    };

    let path = BatchSink::new(dir.path())
        .write(std::slice::from_ref(&record), Uuid::new_v4(), started_at())
        .unwrap();
    let read = read_batch(&path).unwrap();

    assert_eq!(read, vec![record]);
    assert_eq!(read[0].scored().lead.phone, None);
    assert_eq!(read[0].deep_analysis().unwrap().revenue_impact, None);
}

#[test]
fn header_uses_the_published_column_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = BatchSink::new(dir.path())
        .write(&[analysed("Learning")], Uuid::nil(), started_at())
        .unwrap();
    let content = std::fs::read_to_string(path).unwrap();
    let header = content.lines().next().unwrap();
    for column in [
        "RunDate",
        "Geo",
        "BusinessName",
        "CoreWebVitals_LCP",
        "HasSchema",
        "TrafficTrend_90d",
        "Issues",
        "Score",
        "Tier",
        "LLM_PitchAngle",
    ] {
        assert!(header.contains(column), "missing column {column}");
    }
    assert!(content.contains("2026-10-14"));
}

#[test]
fn writing_twice_never_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let sink = BatchSink::new(dir.path());
    let first = sink.write(&[analysed("A")], Uuid::new_v4(), started_at()).unwrap();
    let second = sink.write(&[], Uuid::new_v4(), started_at()).unwrap();
    assert_ne!(first, second);
    assert_eq!(read_batch(&first).unwrap().len(), 1);
    assert!(read_batch(&second).unwrap().is_empty());
    assert_eq!(latest_batch(dir.path()).unwrap(), Some(second));
}

#[test]
fn malformed_list_column_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = BatchSink::new(dir.path())
        .write(&[LeadRecord::Base(scored("A", 70, Tier::Hot))], Uuid::nil(), started_at())
        .unwrap();
    let broken = std::fs::read_to_string(&path)
        .unwrap()
        .replace(r#"[""slow LCP, 8.5s"",""no structured data""]"#, "not json");
    std::fs::write(&path, broken).unwrap();

    let err = read_batch(&path).unwrap_err();
    assert!(matches!(err, OutputError::InvalidColumn { ref column, .. } if column == "Issues"));
}

#[test]
fn stats_count_tiers_and_average() {
    let records = vec![
        analysed("A"),
        LeadRecord::Base(scored("B", 52, Tier::Warm)),
        LeadRecord::Base(scored("C", 10, Tier::Cold)),
        LeadRecord::Base(scored("D", 3, Tier::Cold)),
    ];
    let stats = BatchStats::from_records(&records);
    assert_eq!(stats.total, 4);
    assert_eq!((stats.hot, stats.warm, stats.cold), (1, 1, 2));
    assert_eq!(stats.deep_analyses, 1);
    assert!((stats.average_score - 40.0).abs() < 1e-9);

    assert_eq!(BatchStats::from_records(&[]), BatchStats::default());
}
