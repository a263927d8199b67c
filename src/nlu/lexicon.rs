//! Trilingual keyword and pattern tables.
//!
//! Each incident domain owns its classification keywords and its entity
//! patterns; each severity tier owns its urgency markers. All terms are
//! stored lowercase and matched against lowercased text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{Domain, Language, Severity};

/// Keywords for one domain, split by language
#[derive(Debug)]
pub struct DomainKeywords {
    pub hi: &'static [&'static str],
    pub ta: &'static [&'static str],
    pub en: &'static [&'static str],
}

impl DomainKeywords {
    /// All keywords across the three languages
    pub fn all(&self) -> impl Iterator<Item = &'static str> {
        self.hi
            .iter()
            .chain(self.ta.iter())
            .chain(self.en.iter())
            .copied()
    }
}

const PEST_OUTBREAK: DomainKeywords = DomainKeywords {
    hi: &["कीड़े", "कीट", "टिड्डी", "इल्ली", "फैल", "हमला", "नुकसान", "खा रहे"],
    ta: &["பூச்சி", "வெட்டுக்கிளி", "புழு", "தாக்குதல்", "பரவல்", "சேதம்"],
    en: &[
        "pest", "insect", "locust", "caterpillar", "infestation", "attack", "damage", "eating",
        "outbreak",
    ],
};

const CROP_DISEASE: DomainKeywords = DomainKeywords {
    hi: &["बीमारी", "रोग", "पत्ते", "सूख", "पीला", "धब्बे", "झुलस", "मुरझा"],
    ta: &["நோய்", "இலை", "வாடுதல்", "மஞ்சள்", "புள்ளி", "உலர்வு"],
    en: &[
        "disease", "blight", "leaf", "wilt", "yellow", "spots", "fungal", "rot", "infection",
    ],
};

const WATER_STRESS: DomainKeywords = DomainKeywords {
    hi: &["पानी", "सूखा", "सिंचाई", "कम", "नहीं", "बारिश", "वर्षा"],
    ta: &["தண்ணீர்", "வறட்சி", "நீர்ப்பாசனம்", "பற்றாக்குறை", "மழை"],
    en: &[
        "water", "drought", "irrigation", "shortage", "dry", "rain", "moisture", "stress",
    ],
};

const SOIL_ISSUE: DomainKeywords = DomainKeywords {
    hi: &["मिट्टी", "जमीन", "खारा", "बंजर", "कटाव", "उपजाऊ नहीं"],
    ta: &["மண்", "உவர்", "அரிப்பு", "மலட்டு", "வளம்"],
    en: &[
        "soil", "land", "erosion", "saline", "barren", "infertile", "degradation", "compaction",
    ],
};

const WEATHER_ALERT: DomainKeywords = DomainKeywords {
    hi: &["मौसम", "तूफान", "ओला", "आंधी", "बादल", "गर्मी", "ठंड"],
    ta: &["வானிலை", "புயல்", "கல்மழை", "காற்று", "வெப்பம்"],
    en: &[
        "weather", "storm", "hail", "wind", "heat", "cold", "frost", "cyclone", "alert",
    ],
};

const IRRIGATION_PROBLEM: DomainKeywords = DomainKeywords {
    hi: &["पाइप", "पंप", "नहर", "टूटा", "बंद", "रिसाव", "मोटर"],
    ta: &["குழாய்", "மோட்டார்", "கால்வாய்", "உடைந்த", "கசிவு", "பம்ப்"],
    en: &[
        "pipe", "pump", "canal", "broken", "leak", "motor", "valve", "channel", "blocked",
    ],
};

impl Domain {
    /// Classification keywords for this domain
    pub fn keywords(&self) -> &'static DomainKeywords {
        match self {
            Self::PestOutbreak => &PEST_OUTBREAK,
            Self::CropDisease => &CROP_DISEASE,
            Self::WaterStress => &WATER_STRESS,
            Self::SoilIssue => &SOIL_ISSUE,
            Self::WeatherAlert => &WEATHER_ALERT,
            Self::IrrigationProblem => &IRRIGATION_PROBLEM,
        }
    }

    /// Compiled entity patterns: Hindi, Tamil, English
    pub fn entity_patterns(&self) -> &'static [Regex; 3] {
        match self {
            Self::PestOutbreak => &*PEST_OUTBREAK_ENTITIES,
            Self::CropDisease => &*CROP_DISEASE_ENTITIES,
            Self::WaterStress => &*WATER_STRESS_ENTITIES,
            Self::SoilIssue => &*SOIL_ISSUE_ENTITIES,
            Self::WeatherAlert => &*WEATHER_ALERT_ENTITIES,
            Self::IrrigationProblem => &*IRRIGATION_PROBLEM_ENTITIES,
        }
    }
}

fn compile_entities(alternations: [&str; 3]) -> [Regex; 3] {
    alternations.map(|alternation| {
        Regex::new(&format!("(?i){}", alternation))
            .expect("entity pattern tables are valid regexes")
    })
}

static PEST_OUTBREAK_ENTITIES: Lazy<[Regex; 3]> = Lazy::new(|| {
    compile_entities([
        "धान|गेहूं|मक्का|कपास|टमाटर|कीड़े|टिड्डी|इल्ली",
        "நெல்|கோதுமை|சோளம்|பருத்தி|தக்காளி|பூச்சி|வெட்டுக்கிளி",
        "rice|wheat|corn|cotton|tomato|potato|pest|locust|caterpillar|aphid",
    ])
});

static CROP_DISEASE_ENTITIES: Lazy<[Regex; 3]> = Lazy::new(|| {
    compile_entities([
        "धान|गेहूं|बीमारी|पत्ते|फंगस|फफूंद",
        "நெல்|கோதுமை|நோய்|இலை|பூஞ்சை",
        "rice|wheat|disease|blight|fungal|leaf|rot|wilt",
    ])
});

static WATER_STRESS_ENTITIES: Lazy<[Regex; 3]> = Lazy::new(|| {
    compile_entities([
        "पानी|सिंचाई|सूखा|बारिश|नमी",
        "தண்ணீர்|நீர்ப்பாசனம்|வறட்சி|மழை",
        "water|irrigation|drought|rain|moisture",
    ])
});

static SOIL_ISSUE_ENTITIES: Lazy<[Regex; 3]> = Lazy::new(|| {
    compile_entities([
        "मिट्टी|खारा|उर्वरक|खाद|पोषक",
        "மண்|உவர்|உரம்|ஊட்டச்சத்து",
        "soil|saline|fertilizer|nutrient|erosion",
    ])
});

static WEATHER_ALERT_ENTITIES: Lazy<[Regex; 3]> = Lazy::new(|| {
    compile_entities([
        "मौसम|तूफान|ओला|तापमान|गर्मी",
        "வானிலை|புயல்|கல்மழை|வெப்பநிலை",
        "weather|storm|hail|temperature|heat|frost",
    ])
});

static IRRIGATION_PROBLEM_ENTITIES: Lazy<[Regex; 3]> = Lazy::new(|| {
    compile_entities([
        "पाइप|पंप|मोटर|नहर|रिसाव",
        "குழாய்|மோட்டார்|பம்ப்|கால்வாய்",
        "pipe|pump|motor|canal|leak|valve",
    ])
});

/// Urgency markers for one severity tier
#[derive(Debug)]
pub struct TierKeywords {
    pub en: &'static [&'static str],
    pub hi: Option<&'static [&'static str]>,
    pub ta: Option<&'static [&'static str]>,
}

impl TierKeywords {
    /// Markers for `language`, falling back to English when it has none
    pub fn for_language(&self, language: Language) -> &'static [&'static str] {
        let own = match language {
            Language::En => Some(self.en),
            Language::Hi => self.hi,
            Language::Ta => self.ta,
        };
        own.unwrap_or(self.en)
    }
}

/// Severity ladder, highest priority first. The first tier with a marker in
/// the text wins; anything unmatched is `Low`.
pub const SEVERITY_LADDER: [(Severity, TierKeywords); 3] = [
    (
        Severity::Critical,
        TierKeywords {
            en: &["urgent", "emergency", "critical", "dangerous", "severe", "immediately"],
            hi: Some(&["तुरंत", "जरूरी", "खतरनाक", "गंभीर", "बहुत"]),
            ta: Some(&["உடனடி", "அவசரம்", "ஆபத்தான", "தீவிர"]),
        },
    ),
    (
        Severity::High,
        TierKeywords {
            en: &["very", "much", "serious", "major"],
            hi: Some(&["बहुत", "ज्यादा", "अधिक"]),
            ta: Some(&["மிக", "அதிகம்"]),
        },
    ),
    (
        Severity::Medium,
        TierKeywords {
            en: &["problem", "issue", "difficulty"],
            hi: Some(&["समस्या", "दिक्कत", "परेशानी"]),
            ta: Some(&["பிரச்சினை", "சிரமம்"]),
        },
    ),
];
