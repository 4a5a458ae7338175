//! Reward cards and FAQ entries shown by the client, with their filters.

use std::time::Duration;

/// Filter value that matches every category.
pub const ALL: &str = "all";
/// Points deducted by a redemption.
pub const REDEMPTION_COST: u32 = 100;
/// Simulated latency of a redemption round trip.
pub const REDEEM_DELAY: Duration = Duration::from_millis(1500);
/// Balance shown before any redemption.
pub const STARTING_POINTS: u32 = 2_450;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardCard {
    pub name: &'static str,
    pub category: &'static str,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqItem {
    pub question: &'static str,
    pub answer: &'static str,
    pub category: &'static str,
}

pub const REWARDS: &[RewardCard] = &[
    RewardCard {
        name: "$10 Store Credit",
        category: "discounts",
        points: 1_000,
    },
    RewardCard {
        name: "20% Off Next Purchase",
        category: "discounts",
        points: 750,
    },
    RewardCard {
        name: "Wireless Earbuds",
        category: "products",
        points: 5_000,
    },
    RewardCard {
        name: "Branded Tote Bag",
        category: "products",
        points: 1_200,
    },
    RewardCard {
        name: "Spa Day Voucher",
        category: "experiences",
        points: 8_000,
    },
    RewardCard {
        name: "Concert Tickets",
        category: "experiences",
        points: 10_000,
    },
];

pub const FAQ: &[FaqItem] = &[
    FaqItem {
        question: "How do I earn points?",
        answer: "Earn points on every purchase in store, online, or in the mobile app.",
        category: "points",
    },
    FaqItem {
        question: "Do my points expire?",
        answer: "Points stay active as long as your account has activity in the last 12 months.",
        category: "points",
    },
    FaqItem {
        question: "How do I redeem a reward?",
        answer: "Open the Rewards page, pick a reward, and confirm the redemption.",
        category: "rewards",
    },
    FaqItem {
        question: "Can I cancel a redemption?",
        answer: "Redemptions are final once confirmed.",
        category: "rewards",
    },
    FaqItem {
        question: "How do I reset my password?",
        answer: "Use Change Password under Settings, or contact support.",
        category: "account",
    },
    FaqItem {
        question: "Is my data secure?",
        answer: "Your data is encrypted in transit and never sold to third parties.",
        category: "account",
    },
];

/// Reward cards matching `category`.
pub fn visible_rewards(category: &str) -> Vec<&'static RewardCard> {
    REWARDS
        .iter()
        .filter(|card| category == ALL || card.category == category)
        .collect()
}

/// FAQ items matching both the free-text `search` (case-insensitive, on the
/// question or the answer) and `category`.
pub fn visible_faq(search: &str, category: &str) -> Vec<&'static FaqItem> {
    let needle = search.to_lowercase();
    FAQ.iter()
        .filter(|item| category == ALL || item.category == category)
        .filter(|item| {
            item.question.to_lowercase().contains(&needle)
                || item.answer.to_lowercase().contains(&needle)
        })
        .collect()
}

/// `2450` → `"2,450"`.
pub fn format_points(points: u32) -> String {
    let digits = points.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_matches_every_reward() {
        assert_eq!(visible_rewards(ALL).len(), REWARDS.len());
        let products = visible_rewards("products");
        assert_eq!(products.len(), 2);
        assert!(products.iter().all(|c| c.category == "products"));
        assert!(visible_rewards("travel").is_empty());
    }

    #[test]
    fn faq_search_is_case_insensitive_on_question_and_answer() {
        let hits = visible_faq("PASSWORD", ALL);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].category, "account");

        // Matches on the answer text only.
        assert_eq!(visible_faq("encrypted", ALL).len(), 1);
        assert_eq!(visible_faq("", ALL).len(), FAQ.len());
    }

    #[test]
    fn faq_search_and_category_combine() {
        assert_eq!(visible_faq("", "points").len(), 2);
        assert!(visible_faq("password", "points").is_empty());
    }

    #[test]
    fn points_are_grouped_by_thousands() {
        assert_eq!(format_points(0), "0");
        assert_eq!(format_points(950), "950");
        assert_eq!(format_points(2_450), "2,450");
        assert_eq!(format_points(1_234_567), "1,234,567");
    }
}
