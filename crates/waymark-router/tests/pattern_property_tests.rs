//! Property-based tests for path patterns and route tables
//!
//! Uses proptest to verify:
//! 1. Prefix literals consume whole segments and leave the rest
//! 2. Catch-all routes consume any normalized path
//! 3. The first matching route wins regardless of later routes
//! 4. Parameters capture exactly one segment

use proptest::prelude::*;
use waymark_router::{PathMatch, PathPattern, Route, RouteTable, RouterConfig, normalize_path};

fn segment() -> impl Strategy<Value = String> {
	"[a-z0-9]{1,8}"
}

fn path() -> impl Strategy<Value = Vec<String>> {
	prop::collection::vec(segment(), 0..6)
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(64))]

	/// Property: a prefix literal consumes its segment and leaves the rest
	#[test]
	fn test_prefix_literal_splits_at_segment(head in segment(), tail in path()) {
		let pattern = PathPattern::parse(&head).unwrap();
		let full = std::iter::once(head.clone()).chain(tail.iter().cloned()).collect::<Vec<_>>().join("/");

		let result = pattern.matches(&format!("/{}/", full)).unwrap();
		prop_assert_eq!(result.consumed(), head.as_str());
		prop_assert_eq!(result.remaining(), tail.join("/"));
	}

	/// Property: a literal never matches a longer segment it is a prefix of
	#[test]
	fn test_prefix_literal_respects_segment_boundary(head in segment(), suffix in "[a-z]{1,4}") {
		let pattern = PathPattern::parse(&head).unwrap();
		let candidate = format!("{}{}", head, suffix);
		prop_assert!(!pattern.is_match(&candidate));
	}

	/// Property: a full literal only matches its own path
	#[test]
	fn test_full_literal_rejects_extra_segments(head in segment(), extra in segment()) {
		let pattern = PathPattern::literal(&head, PathMatch::Full).unwrap();
		prop_assert!(pattern.is_match(&head));
		let longer = format!("{}/{}", head, extra);
		prop_assert!(!pattern.is_match(&longer));
	}

	/// Property: the catch-all consumes the normalized path
	#[test]
	fn test_catch_all_consumes_everything(segments in path()) {
		let raw = format!("/{}?q=1", segments.join("/"));
		let result = PathPattern::catch_all().matches(&raw).unwrap();
		prop_assert_eq!(result.consumed(), normalize_path(&raw));
		prop_assert_eq!(result.remaining(), "");
	}

	/// Property: normalizing twice changes nothing
	#[test]
	fn test_normalize_is_idempotent(raw in "[a-z/?#=]{0,24}") {
		let once = normalize_path(&raw);
		prop_assert_eq!(normalize_path(once), once);
	}

	/// Property: the earliest matching route is chosen
	#[test]
	fn test_first_match_wins(head in segment(), tail in path()) {
		let specific = Route::new(&head).redirect_to("specific");
		let catch_all = Route::catch_all().redirect_to("fallback");
		let mut table = RouteTable::new();
		table
			.add([specific.clone(), catch_all.clone(), Route::new(&head).redirect_to("shadowed")])
			.unwrap();

		let candidate = std::iter::once(head.clone()).chain(tail).collect::<Vec<_>>().join("/");
		let matched = table.resolve(&candidate).unwrap();
		prop_assert_eq!(matched.route.id(), specific.id());

		let mut reversed = RouteTable::new();
		reversed.add([catch_all.clone(), specific]).unwrap();
		prop_assert_eq!(reversed.resolve(&candidate).unwrap().route.id(), catch_all.id());
	}

	/// Property: a parameter captures exactly one segment
	#[test]
	fn test_parameter_captures_segment(id in segment(), rest in path()) {
		let pattern = PathPattern::parse("users/{id}").unwrap();
		let mut candidate = format!("users/{}", id);
		if !rest.is_empty() {
			candidate = format!("{}/{}", candidate, rest.join("/"));
		}

		let result = pattern.matches(&candidate).unwrap();
		prop_assert_eq!(result.param("id"), Some(id.as_str()));
		prop_assert_eq!(result.remaining(), rest.join("/"));
	}

	/// Property: paths under the base path keep their relative part
	#[test]
	fn test_strip_base_inverts_to_absolute(base in segment(), segments in path()) {
		let config = RouterConfig::new().with_base_path(format!("/{}", base));
		let relative = segments.join("/");
		let absolute = config.to_absolute(&relative);
		prop_assert_eq!(config.strip_base(&absolute), Some(relative.as_str()));
	}
}
